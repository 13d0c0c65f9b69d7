//! # Label Store
//!
//! Durable record of routing labels keyed by pod identity. Writes must be
//! safe to repeat with the same value.

pub mod dry_run;
pub mod kubernetes;

use crate::error::LabelStoreError;
use async_trait::async_trait;
use std::fmt;

pub use dry_run::DryRunLabelStore;
pub use kubernetes::KubeLabelStore;

/// Pod identity, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub name: String,
    pub namespace: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Control-plane write capability.
#[async_trait]
pub trait LabelStore: Send + Sync {
    /// Record `key=value` on the object identified by `identity`.
    async fn set_label(
        &self,
        identity: &Identity,
        key: &str,
        value: &str,
    ) -> Result<(), LabelStoreError>;
}
