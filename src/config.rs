//! # Configuration
//!
//! Startup configuration, read once. Sources are layered with the `config`
//! crate: built-in defaults, an optional TOML file, then environment
//! variables (`HOSTNAME`, `PG_HOST`, `POLL_INTERVAL`, ...). Keys in the file
//! are the lowercase form of the environment variable names.

use crate::constants::{defaults, env};
use crate::error::ConfigurationError;
use crate::oracle::ProbeTarget;
use crate::reconciler::ReconcilerConfig;
use crate::store::Identity;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Flat view of every configuration source before validation.
#[derive(Debug, Clone, Deserialize)]
struct RawSettings {
    #[serde(default = "default_namespace")]
    namespace: String,
    #[serde(default)]
    hostname: Option<String>,
    #[serde(default = "default_pg_host")]
    pg_host: String,
    #[serde(default = "default_pg_port")]
    pg_port: u16,
    #[serde(default = "default_pg_user")]
    pg_user: String,
    #[serde(default)]
    pg_password: Option<String>,
    #[serde(default)]
    pg_database: Option<String>,
    #[serde(default = "default_poll_interval")]
    poll_interval: u64,
    #[serde(default = "default_failure_threshold")]
    failure_threshold: u32,
    #[serde(default = "default_probe_timeout")]
    probe_timeout: u64,
    #[serde(default = "default_write_timeout")]
    write_timeout: u64,
}

fn default_namespace() -> String {
    defaults::NAMESPACE.to_string()
}

fn default_pg_host() -> String {
    defaults::PG_HOST.to_string()
}

fn default_pg_port() -> u16 {
    defaults::PG_PORT
}

fn default_pg_user() -> String {
    defaults::PG_USER.to_string()
}

fn default_poll_interval() -> u64 {
    defaults::POLL_INTERVAL_SECONDS
}

fn default_failure_threshold() -> u32 {
    defaults::FAILURE_THRESHOLD
}

fn default_probe_timeout() -> u64 {
    defaults::PROBE_TIMEOUT_SECONDS
}

fn default_write_timeout() -> u64 {
    defaults::WRITE_TIMEOUT_SECONDS
}

/// Validated process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelerConfig {
    pub identity: Identity,
    pub probe: ProbeTarget,
    pub poll_interval: Duration,
    pub failure_threshold: u32,
    pub probe_timeout: Duration,
    pub write_timeout: Duration,
}

impl LabelerConfig {
    /// Load from the process environment and an optional TOML file.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigurationError> {
        Self::load_with_env(config_file, None)
    }

    /// Load with an explicit environment map instead of the process
    /// environment. Useful for testing without mutating global state.
    pub fn load_with_env(
        config_file: Option<&Path>,
        environment: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigurationError> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_file {
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        let raw: RawSettings = builder
            .add_source(config::Environment::default().source(environment))
            .build()?
            .try_deserialize()?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, ConfigurationError> {
        let name = raw
            .hostname
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ConfigurationError::missing_required_field(env::HOSTNAME, "pod identity"))?;

        let config = Self {
            identity: Identity::new(name, raw.namespace.trim()),
            probe: ProbeTarget {
                host: raw.pg_host,
                port: raw.pg_port,
                user: raw.pg_user,
                password: raw.pg_password.filter(|p| !p.is_empty()),
                database: raw.pg_database.filter(|d| !d.is_empty()),
            },
            poll_interval: Duration::from_secs(raw.poll_interval),
            failure_threshold: raw.failure_threshold,
            probe_timeout: Duration::from_secs(raw.probe_timeout),
            write_timeout: Duration::from_secs(raw.write_timeout),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.identity.name.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                env::HOSTNAME,
                "pod identity",
            ));
        }

        if self.identity.namespace.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                env::NAMESPACE,
                "pod identity",
            ));
        }

        if self.probe.host.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                env::PG_HOST,
                "database probe",
            ));
        }

        if self.probe.user.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                env::PG_USER,
                "database probe",
            ));
        }

        if self.probe.port == 0 {
            return Err(ConfigurationError::invalid_value(
                env::PG_PORT,
                "0",
                "port must be greater than 0",
            ));
        }

        for (field, value) in [
            (env::POLL_INTERVAL, self.poll_interval),
            (env::PROBE_TIMEOUT, self.probe_timeout),
            (env::WRITE_TIMEOUT, self.write_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigurationError::invalid_value(
                    field,
                    "0",
                    "must be at least 1 second",
                ));
            }
            if value.as_secs() > defaults::MAX_DURATION_SECONDS {
                return Err(ConfigurationError::invalid_value(
                    field,
                    value.as_secs().to_string(),
                    format!("must be at most {} seconds", defaults::MAX_DURATION_SECONDS),
                ));
            }
        }

        if self.failure_threshold == 0 {
            return Err(ConfigurationError::invalid_value(
                env::FAILURE_THRESHOLD,
                "0",
                "must be at least 1",
            ));
        }

        Ok(())
    }

    /// Loop settings for the reconciler.
    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            poll_interval: self.poll_interval,
            failure_threshold: self.failure_threshold,
            probe_timeout: self.probe_timeout,
            write_timeout: self.write_timeout,
            ..ReconcilerConfig::default()
        }
    }

    /// Configuration as JSON with the password masked, for the startup banner.
    pub fn sanitized(&self) -> serde_json::Value {
        serde_json::json!({
            "pod": self.identity.name,
            "namespace": self.identity.namespace,
            "pg_host": self.probe.host,
            "pg_port": self.probe.port,
            "pg_user": self.probe.user,
            "pg_password": self.probe.password.as_ref().map(|_| "***"),
            "pg_database": self.probe.database,
            "poll_interval_seconds": self.poll_interval.as_secs(),
            "failure_threshold": self.failure_threshold,
            "probe_timeout_seconds": self.probe_timeout.as_secs(),
            "write_timeout_seconds": self.write_timeout.as_secs(),
        })
    }
}
