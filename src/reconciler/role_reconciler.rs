//! Reconciler implementation.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::events::{IterationReport, ReconcileEvent};
use super::state::ReconcilerState;
use super::ReconcilerConfig;
use crate::logging::{log_label_write, log_probe_failure, log_role_transition};
use crate::oracle::{ProbeTarget, RoleOracle};
use crate::role::{display_applied, Role};
use crate::store::{Identity, LabelStore};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Slack on top of `probe_timeout` before the loop gives up on the oracle,
/// so the oracle's own connect/query timeout is reported first.
pub const PROBE_TIMEOUT_GRACE: Duration = Duration::from_secs(1);

/// Reconciles the observed replication role into the pod label.
pub struct Reconciler {
    oracle: Arc<dyn RoleOracle>,
    store: Arc<dyn LabelStore>,
    identity: Identity,
    target: ProbeTarget,
    config: ReconcilerConfig,
    state: ReconcilerState,
}

impl Reconciler {
    /// Create a reconciler in the uninitialized state.
    pub fn new(
        oracle: Arc<dyn RoleOracle>,
        store: Arc<dyn LabelStore>,
        identity: Identity,
        target: ProbeTarget,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            oracle,
            store,
            identity,
            target,
            config,
            state: ReconcilerState::new(),
        }
    }

    pub fn state(&self) -> &ReconcilerState {
        &self.state
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Run one probe/decide/write iteration. Never fails; problems are
    /// reported as events and logged.
    pub async fn step(&mut self) -> IterationReport {
        let observed = self.observe().await;
        let mut report = IterationReport::new(observed);

        if observed.is_known() {
            self.state.record_success();
            if self.state.needs_write(observed) {
                report.write_attempted = Some(observed);
                self.apply(observed, &mut report).await;
            } else {
                debug!(role = %observed, "Role unchanged, no label write");
            }
        } else {
            let failures = self.state.record_failure();
            let threshold = self.config.failure_threshold;
            log_probe_failure(failures, threshold);
            report.push(ReconcileEvent::ProbeFailed {
                consecutive_failures: failures,
            });

            if self.state.is_degraded(threshold) {
                warn!(
                    pod = %self.identity,
                    consecutive_failures = failures,
                    threshold = threshold,
                    last_applied_role = display_applied(self.state.last_applied_role()),
                    "Failed to get role {failures} consecutive times"
                );
                report.push(ReconcileEvent::Degraded {
                    consecutive_failures: failures,
                    threshold,
                });
            }
        }

        report
    }

    /// Probe the role, treating an overrunning oracle as a failed probe.
    async fn observe(&self) -> Role {
        let timeout = self.config.probe_timeout;
        let deadline = timeout.saturating_add(PROBE_TIMEOUT_GRACE);
        match tokio::time::timeout(deadline, self.oracle.probe(&self.target, timeout)).await {
            Ok(role) => role,
            Err(_) => {
                warn!(
                    address = %self.target.address(),
                    timeout_seconds = timeout.as_secs(),
                    "Role oracle overran its timeout"
                );
                Role::Unknown
            }
        }
    }

    async fn apply(&mut self, role: Role, report: &mut IterationReport) {
        let Some(value) = role.label_value() else {
            return;
        };
        let previous = self.state.last_applied_role();
        let key = self.config.label_key.as_str();

        info!(
            pod = %self.identity,
            "Role change detected: {} -> {role}",
            display_applied(previous)
        );

        let write = self.store.set_label(&self.identity, key, value);
        let outcome = match tokio::time::timeout(self.config.write_timeout, write).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(_) => Err(crate::error::LabelStoreError::Timeout {
                timeout: self.config.write_timeout,
            }
            .to_string()),
        };

        match outcome {
            Ok(()) => {
                self.state.commit(role);
                log_label_write(&self.identity.name, key, value, "success", None);
                log_role_transition(
                    &self.identity.name,
                    &self.identity.namespace,
                    previous,
                    role,
                );
                report.push(ReconcileEvent::Transition { from: previous, to: role });
            }
            Err(reason) => {
                log_label_write(&self.identity.name, key, value, "failed", Some(&reason));
                report.push(ReconcileEvent::WriteFailed { role, reason });
            }
        }
    }

    /// Tick source for the loop. Callers reset it after every iteration, so
    /// the wait is measured from the end of the previous iteration.
    fn ticker(&self) -> Interval {
        let mut ticker = tokio::time::interval(self.config.poll_interval.max(MIN_POLL_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    /// Run `iterations` ticks of the loop and return their reports.
    ///
    /// The first iteration runs immediately; each later one starts a full
    /// poll interval after the previous one finished. Under a paused tokio
    /// clock this completes without real waiting.
    pub async fn run_iterations(&mut self, iterations: usize) -> Vec<IterationReport> {
        let mut ticker = self.ticker();
        let mut reports = Vec::with_capacity(iterations);
        for _ in 0..iterations {
            ticker.tick().await;
            reports.push(self.step().await);
            ticker.reset();
        }
        reports
    }

    /// Run forever. Only process termination stops the loop.
    pub async fn run(mut self) -> Infallible {
        info!(
            pod = %self.identity,
            address = %self.target.address(),
            poll_interval_seconds = self.config.poll_interval.as_secs(),
            failure_threshold = self.config.failure_threshold,
            "🚀 Reconciliation loop started"
        );

        let mut ticker = self.ticker();
        loop {
            ticker.tick().await;
            let report = self.step().await;
            ticker.reset();
            debug!(
                observed = %report.observed,
                events = report.events.len(),
                "Iteration complete"
            );
        }
    }
}
