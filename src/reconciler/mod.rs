//! # Role Reconciler
//!
//! The control loop that keeps the pod's role label in line with what the
//! database reports.
//!
//! Each iteration:
//! 1. probes the role (bounded by `probe_timeout`),
//! 2. writes the label only when the observed role differs from the last
//!    role written successfully,
//! 3. counts failed probes and warns once the streak reaches
//!    `failure_threshold`,
//! 4. waits for the next tick of `poll_interval`.
//!
//! Probe and write failures never stop the loop. A failed write leaves the
//! applied role untouched, so the next matching observation retries it.

pub mod events;
pub mod role_reconciler;
pub mod state;

use crate::constants::{defaults, ROLE_LABEL_KEY};
use std::time::Duration;

pub use events::{IterationReport, ReconcileEvent};
pub use role_reconciler::{Reconciler, PROBE_TIMEOUT_GRACE};
pub use state::ReconcilerState;

/// Loop settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Fixed delay between iterations
    pub poll_interval: Duration,
    /// Failed probes in a row before the degraded-health warning
    pub failure_threshold: u32,
    pub probe_timeout: Duration,
    pub write_timeout: Duration,
    /// Label the role is written under
    pub label_key: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(defaults::POLL_INTERVAL_SECONDS),
            failure_threshold: defaults::FAILURE_THRESHOLD,
            probe_timeout: Duration::from_secs(defaults::PROBE_TIMEOUT_SECONDS),
            write_timeout: Duration::from_secs(defaults::WRITE_TIMEOUT_SECONDS),
            label_key: ROLE_LABEL_KEY.to_string(),
        }
    }
}
