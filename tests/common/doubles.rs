//! Deterministic stand-ins for the role oracle and label store.

use async_trait::async_trait;
use pg_role_labeler::{
    Identity, LabelStore, LabelStoreError, ProbeTarget, Reconciler, ReconcilerConfig, Role,
    RoleOracle,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted probe answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Answer(Role),
    /// Answers after the given delay
    Delayed(Role, Duration),
    /// Never answers; the reconciler's timeout has to cut it off
    Hang,
}

/// Replays a fixed sequence of probe answers, then reports `Unknown`.
pub struct ScriptedRoleOracle {
    script: Mutex<VecDeque<Probe>>,
    calls: AtomicUsize,
}

impl ScriptedRoleOracle {
    pub fn new(script: impl IntoIterator<Item = Probe>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn roles(roles: &[Role]) -> Arc<Self> {
        Self::new(roles.iter().copied().map(Probe::Answer))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleOracle for ScriptedRoleOracle {
    async fn probe(&self, _target: &ProbeTarget, _timeout: Duration) -> Role {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Probe::Answer(role)) => role,
            Some(Probe::Delayed(role, delay)) => {
                tokio::time::sleep(delay).await;
                role
            }
            Some(Probe::Hang) => std::future::pending().await,
            None => Role::Unknown,
        }
    }
}

/// Scripted outcome of a label write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    Succeed,
    Fail,
    Hang,
}

/// A label write the store received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    pub identity: Identity,
    pub key: String,
    pub value: String,
    pub committed: bool,
}

/// Records every write attempt; outcomes follow a script, then succeed.
#[derive(Default)]
pub struct RecordingLabelStore {
    outcomes: Mutex<VecDeque<Write>>,
    writes: Mutex<Vec<RecordedWrite>>,
}

impl RecordingLabelStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn scripted(outcomes: impl IntoIterator<Item = Write>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            writes: Mutex::new(Vec::new()),
        })
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn attempted_values(&self) -> Vec<String> {
        self.writes().into_iter().map(|w| w.value).collect()
    }

    /// Value currently held by the store, as the routing layer would see it
    pub fn current_value(&self) -> Option<String> {
        self.writes()
            .into_iter()
            .rev()
            .find(|w| w.committed)
            .map(|w| w.value)
    }
}

#[async_trait]
impl LabelStore for RecordingLabelStore {
    async fn set_label(
        &self,
        identity: &Identity,
        key: &str,
        value: &str,
    ) -> Result<(), LabelStoreError> {
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Write::Succeed);

        self.writes.lock().unwrap().push(RecordedWrite {
            identity: identity.clone(),
            key: key.to_string(),
            value: value.to_string(),
            committed: outcome == Write::Succeed,
        });

        match outcome {
            Write::Succeed => Ok(()),
            Write::Fail => Err(LabelStoreError::Rejected {
                message: "the server is currently unable to handle the request".to_string(),
            }),
            Write::Hang => std::future::pending().await,
        }
    }
}

pub fn test_identity() -> Identity {
    Identity::new("postgres-0", "db")
}

pub fn test_config(failure_threshold: u32) -> ReconcilerConfig {
    ReconcilerConfig {
        failure_threshold,
        ..ReconcilerConfig::default()
    }
}

pub fn build_reconciler(
    oracle: Arc<ScriptedRoleOracle>,
    store: Arc<RecordingLabelStore>,
    config: ReconcilerConfig,
) -> Reconciler {
    Reconciler::new(
        oracle,
        store,
        test_identity(),
        ProbeTarget::new("localhost", 5432, "postgres"),
        config,
    )
}
