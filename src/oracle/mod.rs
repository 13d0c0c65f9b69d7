//! # Role Oracle
//!
//! Answers "what role is this instance in right now". Implementations must
//! never fail past this boundary: every connectivity, timeout or protocol
//! error is reported as [`Role::Unknown`].

pub mod postgres;

use crate::role::Role;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

pub use postgres::PostgresRoleOracle;

/// Connection parameters for a role probe.
#[derive(Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: Option<String>,
}

impl ProbeTarget {
    pub fn new(host: impl Into<String>, port: u16, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: None,
            database: None,
        }
    }

    /// `host:port` for log lines
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Keep the password out of debug output
impl fmt::Debug for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .finish()
    }
}

/// Source of truth for the replication role.
#[async_trait]
pub trait RoleOracle: Send + Sync {
    /// Determine the current role, giving up after `timeout`.
    async fn probe(&self, target: &ProbeTarget, timeout: Duration) -> Role;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_masks_password() {
        let mut target = ProbeTarget::new("localhost", 5432, "postgres");
        target.password = Some("hunter2".to_string());

        let rendered = format!("{target:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("***"));
        assert_eq!(target.address(), "localhost:5432");
    }
}
