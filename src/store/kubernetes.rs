//! Kubernetes pod label store.

use super::{Identity, LabelStore};
use crate::constants::FIELD_MANAGER;
use crate::error::LabelStoreError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, Patch, PatchParams};
use kube::Client;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Writes labels onto pods with a JSON merge patch.
///
/// The client is built on the first write from the in-cluster service
/// account (or kubeconfig) and reused afterwards. A failure to build it is a
/// failed write, retried on the next iteration like any other.
pub struct KubeLabelStore {
    client: OnceCell<Client>,
}

impl KubeLabelStore {
    pub fn new() -> Self {
        Self {
            client: OnceCell::new(),
        }
    }

    /// Use an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client: OnceCell::new_with(Some(client)),
        }
    }

    async fn client(&self) -> Result<&Client, LabelStoreError> {
        self.client
            .get_or_try_init(|| async {
                let client = Client::try_default()
                    .await
                    .map_err(|e| LabelStoreError::ClientInit {
                        message: e.to_string(),
                    })?;
                info!(
                    default_namespace = %client.default_namespace(),
                    "☸️ Kubernetes client initialized"
                );
                Ok::<Client, LabelStoreError>(client)
            })
            .await
    }

    /// Patch parameters identifying this sidecar as the field manager.
    pub fn patch_params() -> PatchParams {
        PatchParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..PatchParams::default()
        }
    }

    /// Merge patch body setting a single label.
    pub fn label_patch(key: &str, value: &str) -> serde_json::Value {
        json!({
            "metadata": {
                "labels": {
                    key: value
                }
            }
        })
    }
}

impl Default for KubeLabelStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LabelStore for KubeLabelStore {
    async fn set_label(
        &self,
        identity: &Identity,
        key: &str,
        value: &str,
    ) -> Result<(), LabelStoreError> {
        let client = self.client().await?;
        let pods: Api<Pod> = Api::namespaced(client.clone(), &identity.namespace);
        let patch = Self::label_patch(key, value);

        debug!(pod = %identity, label = %format!("{key}={value}"), "Patching pod labels");

        pods.patch(&identity.name, &Self::patch_params(), &Patch::Merge(&patch))
            .await
            .map_err(|source| LabelStoreError::Api {
                namespace: identity.namespace.clone(),
                name: identity.name.clone(),
                source,
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_patch_shape() {
        let patch = KubeLabelStore::label_patch("pg-role", "primary");
        assert_eq!(patch["metadata"]["labels"]["pg-role"], "primary");
        assert_eq!(patch["metadata"].as_object().map(|m| m.len()), Some(1));
    }

    #[test]
    fn test_patch_params_report_field_manager() {
        let params = KubeLabelStore::patch_params();
        assert_eq!(params.field_manager.as_deref(), Some("pg-role-labeler"));
        assert!(!params.force);
        assert!(!params.dry_run);
    }
}
