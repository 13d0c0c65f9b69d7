#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # PG Role Labeler
//!
//! Sidecar that keeps a pod's `pg-role` label in line with the replication
//! role of the PostgreSQL instance it runs next to.
//!
//! ## Overview
//!
//! A Service selecting `pg-role=primary` (or `replica`) only routes correctly
//! if the label follows failovers. The labeler polls the local database with
//! `SELECT pg_is_in_recovery()` and merge-patches the pod label whenever the
//! observed role differs from the last one it wrote. It never decides which
//! instance should be primary and keeps no state across restarts.
//!
//! ## Module Organization
//!
//! - [`reconciler`] - The control loop and its state machine
//! - [`oracle`] - Role probes (`RoleOracle`, PostgreSQL implementation)
//! - [`store`] - Label writes (`LabelStore`, Kubernetes and dry-run)
//! - [`config`] - Startup configuration
//! - [`logging`] - Structured logging setup and helpers
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pg_role_labeler::config::LabelerConfig;
//! use pg_role_labeler::oracle::PostgresRoleOracle;
//! use pg_role_labeler::reconciler::Reconciler;
//! use pg_role_labeler::store::KubeLabelStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LabelerConfig::load(None)?;
//! let reconciler = Reconciler::new(
//!     Arc::new(PostgresRoleOracle::new()),
//!     Arc::new(KubeLabelStore::new()),
//!     config.identity.clone(),
//!     config.probe.clone(),
//!     config.reconciler_config(),
//! );
//!
//! // Runs until the process is terminated
//! reconciler.run().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod oracle;
pub mod reconciler;
pub mod role;
pub mod store;

pub use crate::config::LabelerConfig;
pub use constants::ROLE_LABEL_KEY;
pub use error::{ConfigurationError, LabelStoreError, LabelerError, ProbeError, Result};
pub use oracle::{PostgresRoleOracle, ProbeTarget, RoleOracle};
pub use reconciler::{IterationReport, ReconcileEvent, Reconciler, ReconcilerConfig, ReconcilerState};
pub use role::Role;
pub use store::{DryRunLabelStore, Identity, KubeLabelStore, LabelStore};
