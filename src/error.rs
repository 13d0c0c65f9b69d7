//! # Error Types
//!
//! Structured errors for each concern. Steady-state failures (probe, label
//! write) are absorbed by the reconciler and turned into log events; only
//! configuration errors ever reach the process boundary.

use std::time::Duration;
use thiserror::Error;

/// Startup configuration errors. Always fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Missing required configuration field: {field} ({context})")]
    MissingRequiredField { field: String, context: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {message}")]
    Load { message: String },
}

impl ConfigurationError {
    pub fn missing_required_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
            context: context.into(),
        }
    }

    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigurationError {
    fn from(err: config::ConfigError) -> Self {
        Self::Load {
            message: err.to_string(),
        }
    }
}

/// Failures writing a label to the control plane.
#[derive(Error, Debug)]
pub enum LabelStoreError {
    #[error("Kubernetes client initialization failed: {message}")]
    ClientInit { message: String },

    #[error("Kubernetes API error patching {namespace}/{name}: {source}")]
    Api {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Label write timed out after {}s", .timeout.as_secs())]
    Timeout { timeout: Duration },

    #[error("Label store rejected write: {message}")]
    Rejected { message: String },
}

/// Failures determining the role. Internal to the role oracle, which
/// normalizes every variant to `Role::Unknown`.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Database connection error: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Database query error: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Probe timed out after {}s during {stage}", .timeout.as_secs())]
    Timeout {
        stage: &'static str,
        timeout: Duration,
    },
}

impl ProbeError {
    /// Whether the failure is about reaching the database at all, as opposed
    /// to a protocol or query problem once connected.
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::Connect(_) | Self::Timeout { .. } => true,
            Self::Query(err) => matches!(
                err,
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
            ),
        }
    }
}

/// Crate-level error.
#[derive(Error, Debug)]
pub enum LabelerError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Logging initialization error: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, LabelerError>;
