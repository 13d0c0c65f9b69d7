//! In-memory reconciler state.

use crate::role::Role;

/// What the loop knows between iterations.
///
/// Owned by a single [`Reconciler`](super::Reconciler); never shared and
/// never persisted. The applied role only moves through [`commit`], which the
/// reconciler calls right after a successful label write.
///
/// [`commit`]: ReconcilerState::commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilerState {
    last_applied_role: Option<Role>,
    consecutive_failures: u32,
}

impl ReconcilerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Role most recently written successfully, `None` before the first write.
    pub fn last_applied_role(&self) -> Option<Role> {
        self.last_applied_role
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Whether an observed role has to be written to converge.
    pub fn needs_write(&self, observed: Role) -> bool {
        observed.is_known() && self.last_applied_role != Some(observed)
    }

    pub fn is_degraded(&self, threshold: u32) -> bool {
        self.consecutive_failures >= threshold
    }

    pub(crate) fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Count a failed probe, returning the new streak length.
    pub(crate) fn record_failure(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }

    pub(crate) fn commit(&mut self, role: Role) {
        debug_assert!(role.is_known(), "unknown role is never applied");
        self.last_applied_role = Some(role);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_uninitialized() {
        let state = ReconcilerState::new();
        assert_eq!(state.last_applied_role(), None);
        assert_eq!(state.consecutive_failures(), 0);
        assert!(state.needs_write(Role::Primary));
        assert!(state.needs_write(Role::Replica));
        assert!(!state.needs_write(Role::Unknown));
    }

    #[test]
    fn test_commit_suppresses_identical_write() {
        let mut state = ReconcilerState::new();
        state.commit(Role::Primary);
        assert!(!state.needs_write(Role::Primary));
        assert!(state.needs_write(Role::Replica));
    }

    #[test]
    fn test_failure_streak() {
        let mut state = ReconcilerState::new();
        assert_eq!(state.record_failure(), 1);
        assert_eq!(state.record_failure(), 2);
        assert!(state.is_degraded(2));
        assert!(!state.is_degraded(3));

        state.record_success();
        assert_eq!(state.consecutive_failures(), 0);
    }

    #[test]
    fn test_failure_counter_saturates() {
        let mut state = ReconcilerState {
            last_applied_role: None,
            consecutive_failures: u32::MAX,
        };
        assert_eq!(state.record_failure(), u32::MAX);
    }
}
