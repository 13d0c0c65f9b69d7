//! Label store that only logs, for running outside a cluster.

use super::{Identity, LabelStore};
use crate::error::LabelStoreError;
use async_trait::async_trait;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct DryRunLabelStore;

impl DryRunLabelStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LabelStore for DryRunLabelStore {
    async fn set_label(
        &self,
        identity: &Identity,
        key: &str,
        value: &str,
    ) -> Result<(), LabelStoreError> {
        info!(
            pod = %identity,
            label = %format!("{key}={value}"),
            "🧪 DRY RUN: would patch pod label"
        );
        Ok(())
    }
}
