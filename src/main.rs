//! # PG Role Labeler
//!
//! Sidecar binary: probes the local PostgreSQL role and keeps the pod's
//! `pg-role` label current until the process is terminated.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use pg_role_labeler::logging::{self, LogFormat};
use pg_role_labeler::{
    DryRunLabelStore, KubeLabelStore, LabelStore, LabelerConfig, PostgresRoleOracle, Reconciler,
    ROLE_LABEL_KEY,
};

#[derive(Parser, Debug)]
#[command(name = "pg-role-labeler")]
#[command(about = "Label a pod with the replication role of its PostgreSQL instance")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Optional TOML file layered under environment variables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log label writes instead of patching the pod
    #[arg(long)]
    dry_run: bool,

    /// Log output format (pretty or json); defaults by environment
    #[arg(long)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_structured_logging(cli.log_format) {
        eprintln!("pg-role-labeler: {e}");
        return ExitCode::FAILURE;
    }

    let config = match LabelerConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid startup configuration");
            return ExitCode::FAILURE;
        }
    };

    info!(
        pod = %config.identity.name,
        namespace = %config.identity.namespace,
        label = ROLE_LABEL_KEY,
        dry_run = cli.dry_run,
        "Starting pod labeler for {} in namespace {}",
        config.identity.name,
        config.identity.namespace
    );
    info!(
        address = %config.probe.address(),
        poll_interval_seconds = config.poll_interval.as_secs(),
        settings = %config.sanitized(),
        "Connecting to PostgreSQL at {}",
        config.probe.address()
    );

    let store: Arc<dyn LabelStore> = if cli.dry_run {
        Arc::new(DryRunLabelStore::new())
    } else {
        Arc::new(KubeLabelStore::new())
    };

    let reconciler = Reconciler::new(
        Arc::new(PostgresRoleOracle::new()),
        store,
        config.identity.clone(),
        config.probe.clone(),
        config.reconciler_config(),
    );

    tokio::select! {
        never = reconciler.run() => match never {},
        result = shutdown_signal() => {
            if let Err(e) = result {
                error!(error = %e, "Failed to listen for shutdown signal");
                return ExitCode::FAILURE;
            }
            info!("Shutdown signal received, exiting");
        }
    }

    ExitCode::SUCCESS
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = terminate.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}
