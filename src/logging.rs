//! # Structured Logging Module
//!
//! Environment-aware structured logging for the labeler. Development output is
//! human readable; production output is one JSON object per line so the
//! cluster log pipeline can index role transitions.

use crate::constants::env::ENVIRONMENT_CHAIN;
use crate::error::{LabelerError, Result};
use crate::role::{display_applied, Role};
use chrono::Utc;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Output format of the console layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Format used when none is requested explicitly
    pub fn for_environment(environment: &str) -> Self {
        match environment {
            "production" | "staging" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unsupported log format: {other} (expected pretty or json)")),
        }
    }
}

/// Initialize structured logging with environment-specific configuration.
///
/// `RUST_LOG` takes precedence over the environment default level. Calling
/// this more than once is a no-op.
pub fn init_structured_logging(format: Option<LogFormat>) -> Result<()> {
    if LOGGER_INITIALIZED.get().is_some() {
        return Ok(());
    }

    let environment = get_environment();
    let format = format.unwrap_or_else(|| LogFormat::for_environment(&environment));
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(get_log_level(&environment))
            .map_err(|e| LabelerError::Logging(e.to_string()))?,
    };

    let console: Box<dyn Layer<Registry> + Send + Sync> = match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(false)
            .json()
            .with_filter(filter)
            .boxed(),
    };

    // Don't fail if a global subscriber is already installed (tests, embedding)
    if tracing_subscriber::registry().with(console).try_init().is_err() {
        tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
    }

    LOGGER_INITIALIZED.get_or_init(|| ());

    tracing::info!(
        environment = %environment,
        format = ?format,
        "🔧 STRUCTURED LOGGING: Initialized"
    );

    Ok(())
}

/// Get current environment from environment variables
pub fn get_environment() -> String {
    ENVIRONMENT_CHAIN
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "test" => "debug".to_string(),
        "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log a committed role change
pub fn log_role_transition(pod: &str, namespace: &str, from: Option<Role>, to: Role) {
    tracing::info!(
        pod = %pod,
        namespace = %namespace,
        from = display_applied(from),
        to = %to,
        timestamp = %Utc::now().to_rfc3339(),
        "🔄 ROLE_TRANSITION: {} -> {}",
        display_applied(from),
        to
    );
}

/// Log the outcome of a label write
pub fn log_label_write(pod: &str, key: &str, value: &str, status: &str, details: Option<&str>) {
    if status == "success" {
        tracing::info!(
            pod = %pod,
            label = %format!("{key}={value}"),
            status = %status,
            timestamp = %Utc::now().to_rfc3339(),
            "🏷️ LABEL_WRITE"
        );
    } else {
        tracing::error!(
            pod = %pod,
            label = %format!("{key}={value}"),
            status = %status,
            details = details,
            timestamp = %Utc::now().to_rfc3339(),
            "❌ LABEL_WRITE"
        );
    }
}

/// Log a failed role probe
pub fn log_probe_failure(consecutive_failures: u32, threshold: u32) {
    tracing::warn!(
        consecutive_failures = consecutive_failures,
        threshold = threshold,
        timestamp = %Utc::now().to_rfc3339(),
        "⚠️ PROBE_FAILURE"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("unknown"), "debug");
    }

    #[test]
    fn test_format_selection() {
        assert_eq!(LogFormat::for_environment("production"), LogFormat::Json);
        assert_eq!(LogFormat::for_environment("development"), LogFormat::Pretty);
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("text".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_init_is_idempotent() {
        assert!(init_structured_logging(Some(LogFormat::Pretty)).is_ok());
        assert!(init_structured_logging(Some(LogFormat::Json)).is_ok());
    }
}
