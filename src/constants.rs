//! # System Constants
//!
//! Label keys, environment variable names and operational defaults shared by
//! the reconciler, the collaborators and the configuration layer.

/// Label written onto the pod and consumed by Service selectors.
pub const ROLE_LABEL_KEY: &str = "pg-role";

/// Query answering "is this instance a standby".
pub const RECOVERY_PROBE_QUERY: &str = "SELECT pg_is_in_recovery()";

/// Field manager reported to the Kubernetes API server.
pub const FIELD_MANAGER: &str = "pg-role-labeler";

/// `application_name` of probe connections, visible in `pg_stat_activity`.
pub const PROBE_APPLICATION_NAME: &str = "pg-role-labeler";

/// Operational defaults applied before any configuration source.
pub mod defaults {
    pub const NAMESPACE: &str = "db";
    pub const PG_HOST: &str = "localhost";
    pub const PG_PORT: u16 = 5432;
    pub const PG_USER: &str = "postgres";

    /// Seconds between probes
    pub const POLL_INTERVAL_SECONDS: u64 = 10;

    /// Consecutive failed probes before the degraded-health warning
    pub const FAILURE_THRESHOLD: u32 = 5;

    pub const PROBE_TIMEOUT_SECONDS: u64 = 5;
    pub const WRITE_TIMEOUT_SECONDS: u64 = 10;

    /// Upper bound for the interval and timeout settings (one day)
    pub const MAX_DURATION_SECONDS: u64 = 86_400;
}

/// Environment variables read at startup.
pub mod env {
    pub const NAMESPACE: &str = "NAMESPACE";
    pub const HOSTNAME: &str = "HOSTNAME";
    pub const PG_HOST: &str = "PG_HOST";
    pub const PG_PORT: &str = "PG_PORT";
    pub const PG_USER: &str = "PG_USER";
    pub const PG_PASSWORD: &str = "PG_PASSWORD";
    pub const PG_DATABASE: &str = "PG_DATABASE";
    pub const POLL_INTERVAL: &str = "POLL_INTERVAL";
    pub const FAILURE_THRESHOLD: &str = "FAILURE_THRESHOLD";
    pub const PROBE_TIMEOUT: &str = "PROBE_TIMEOUT";
    pub const WRITE_TIMEOUT: &str = "WRITE_TIMEOUT";

    /// Deployment environment chain, first match wins
    pub const ENVIRONMENT_CHAIN: &[&str] = &["LABELER_ENV", "APP_ENV"];
}
