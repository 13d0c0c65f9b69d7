//! Events and per-iteration reports.

use crate::role::{display_applied, Role};
use std::fmt;

/// Observable outcome of an iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    /// A label write committed a new role.
    Transition { from: Option<Role>, to: Role },
    /// A label write was attempted and did not commit.
    WriteFailed { role: Role, reason: String },
    /// The probe could not determine the role.
    ProbeFailed { consecutive_failures: u32 },
    /// The failure streak is at or beyond the warning threshold.
    Degraded {
        consecutive_failures: u32,
        threshold: u32,
    },
}

impl fmt::Display for ReconcileEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transition { from, to } => {
                write!(f, "role transition {} -> {to}", display_applied(*from))
            }
            Self::WriteFailed { role, reason } => {
                write!(f, "label write for {role} failed: {reason}")
            }
            Self::ProbeFailed {
                consecutive_failures,
            } => write!(f, "role probe failed ({consecutive_failures} consecutive)"),
            Self::Degraded {
                consecutive_failures,
                threshold,
            } => write!(
                f,
                "failed to get role {consecutive_failures} consecutive times (threshold {threshold})"
            ),
        }
    }
}

/// What a single iteration observed and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationReport {
    pub observed: Role,
    /// Role a label write was attempted for, if any
    pub write_attempted: Option<Role>,
    pub events: Vec<ReconcileEvent>,
}

impl IterationReport {
    pub fn new(observed: Role) -> Self {
        Self {
            observed,
            write_attempted: None,
            events: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, event: ReconcileEvent) {
        self.events.push(event);
    }

    /// Whether a label write committed this iteration.
    pub fn committed(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, ReconcileEvent::Transition { .. }))
    }

    pub fn is_degraded(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, ReconcileEvent::Degraded { .. }))
    }
}
