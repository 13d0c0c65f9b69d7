//! Replication role of the local PostgreSQL instance.

use std::fmt;

/// Tri-state answer of a role probe.
///
/// `Unknown` stands for any failure to determine the role. It has no label
/// value and is never written to the label store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Read/write source (`pg_is_in_recovery() = false`)
    Primary,
    /// Read-only standby (`pg_is_in_recovery() = true`)
    Replica,
    Unknown,
}

impl Role {
    /// Map the result of `pg_is_in_recovery()`.
    pub fn from_recovery_flag(in_recovery: bool) -> Self {
        if in_recovery {
            Self::Replica
        } else {
            Self::Primary
        }
    }

    /// Value written under the role label, `None` for `Unknown`.
    pub fn label_value(self) -> Option<&'static str> {
        match self {
            Self::Primary => Some("primary"),
            Self::Replica => Some("replica"),
            Self::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    pub fn as_str(self) -> &'static str {
        self.label_value().unwrap_or("unknown")
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render an optional applied role for log lines (`none` before the first
/// successful write).
pub fn display_applied(role: Option<Role>) -> &'static str {
    role.map_or("none", Role::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_flag_mapping() {
        assert_eq!(Role::from_recovery_flag(true), Role::Replica);
        assert_eq!(Role::from_recovery_flag(false), Role::Primary);
    }

    #[test]
    fn test_unknown_has_no_label_value() {
        assert_eq!(Role::Primary.label_value(), Some("primary"));
        assert_eq!(Role::Replica.label_value(), Some("replica"));
        assert_eq!(Role::Unknown.label_value(), None);
        assert!(!Role::Unknown.is_known());
    }

    #[test]
    fn test_display() {
        assert_eq!(Role::Primary.to_string(), "primary");
        assert_eq!(Role::Unknown.to_string(), "unknown");
        assert_eq!(display_applied(None), "none");
        assert_eq!(display_applied(Some(Role::Replica)), "replica");
    }
}
