//! PostgreSQL role oracle.
//!
//! Every probe opens its own connection, asks `pg_is_in_recovery()` and
//! closes it again. No pool is kept between iterations, so a broken
//! connection cannot leak from one probe into the next.

use super::{ProbeTarget, RoleOracle};
use crate::constants::{PROBE_APPLICATION_NAME, RECOVERY_PROBE_QUERY};
use crate::error::ProbeError;
use crate::role::Role;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Role oracle backed by a live PostgreSQL instance.
#[derive(Debug, Clone, Default)]
pub struct PostgresRoleOracle;

impl PostgresRoleOracle {
    pub fn new() -> Self {
        Self
    }

    fn connect_options(target: &ProbeTarget) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&target.host)
            .port(target.port)
            .username(&target.user)
            .application_name(PROBE_APPLICATION_NAME);

        if let Some(password) = &target.password {
            options = options.password(password);
        }
        if let Some(database) = &target.database {
            options = options.database(database);
        }

        options
    }

    /// Run one probe, surfacing the failure reason.
    pub async fn query_role(target: &ProbeTarget, timeout: Duration) -> Result<Role, ProbeError> {
        let started = Instant::now();
        let options = Self::connect_options(target);

        let mut conn = tokio::time::timeout(timeout, PgConnection::connect_with(&options))
            .await
            .map_err(|_| ProbeError::Timeout {
                stage: "connect",
                timeout,
            })?
            .map_err(ProbeError::Connect)?;

        let remaining = timeout.saturating_sub(started.elapsed());
        let query = sqlx::query_scalar::<_, bool>(RECOVERY_PROBE_QUERY).fetch_one(&mut conn);

        // On the error paths `conn` is dropped here, which closes the socket
        let in_recovery = tokio::time::timeout(remaining, query)
            .await
            .map_err(|_| ProbeError::Timeout {
                stage: "query",
                timeout,
            })?
            .map_err(ProbeError::Query)?;

        if let Err(e) = conn.close().await {
            debug!(error = %e, "Error closing probe connection");
        }

        Ok(Role::from_recovery_flag(in_recovery))
    }
}

#[async_trait]
impl RoleOracle for PostgresRoleOracle {
    async fn probe(&self, target: &ProbeTarget, timeout: Duration) -> Role {
        match Self::query_role(target, timeout).await {
            Ok(role) => {
                debug!(address = %target.address(), role = %role, "Role probe succeeded");
                role
            }
            Err(e) if e.is_connectivity() => {
                warn!(address = %target.address(), error = %e, "Database connection error");
                Role::Unknown
            }
            Err(e) => {
                error!(address = %target.address(), error = %e, "Unexpected error getting role");
                Role::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_database_is_unknown() {
        // Port 1 on loopback refuses connections immediately
        let target = ProbeTarget::new("127.0.0.1", 1, "postgres");
        let role = PostgresRoleOracle::new()
            .probe(&target, Duration::from_secs(2))
            .await;
        assert_eq!(role, Role::Unknown);
    }

    #[tokio::test]
    async fn test_connect_error_is_connectivity() {
        let target = ProbeTarget::new("127.0.0.1", 1, "postgres");
        let err = PostgresRoleOracle::query_role(&target, Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(err.is_connectivity());
    }
}
