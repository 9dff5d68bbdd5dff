use crate::error::{self, Result};
use async_trait::async_trait;
use kube::api::{Api, DeleteParams, DynamicObject, GroupVersionKind, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::discovery::{ApiCapabilities, ApiResource, Discovery, Scope};
use kube::{Client, Config};
use log::{debug, info};
use serde::Deserialize;
use snafu::{OptionExt, ResultExt};
use std::path::Path;

const DEFAULT_NAMESPACE: &str = "default";

/// Applies and removes the objects of a manifest file on a cluster.
#[async_trait]
pub trait K8sClient: Send + Sync {
    /// Create every object in the manifest at `path`.
    async fn create_manifest(&self, path: &Path) -> Result<()>;

    /// Delete every object in the manifest at `path`. Objects that do not exist are skipped.
    async fn delete_manifest(&self, path: &Path) -> Result<()>;
}

/// A [`K8sClient`] backed by `kube`, resolving each object's kind through API discovery.
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
}

/// An object of a manifest with the API it is served by.
struct ManifestObject {
    name: String,
    kind: String,
    api: Api<DynamicObject>,
    object: DynamicObject,
}

impl KubeClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the kubeconfig file at `path`.
    pub async fn from_kubeconfig_path(path: &Path) -> Result<Self> {
        let kubeconfig = Kubeconfig::read_from(path).context(error::KubeconfigSnafu)?;
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .context(error::KubeconfigSnafu)?;
        Ok(Self::new(
            Client::try_from(config).context(error::KubeClientSnafu)?,
        ))
    }

    /// Build a client from `KUBECONFIG`, `~/.kube/config` or the in-cluster environment.
    pub async fn try_default() -> Result<Self> {
        let config = Config::infer().await.context(error::InferConfigSnafu)?;
        Ok(Self::new(
            Client::try_from(config).context(error::KubeClientSnafu)?,
        ))
    }

    async fn manifest_objects(&self, path: &Path) -> Result<Vec<ManifestObject>> {
        let text = tokio::fs::read_to_string(path)
            .await
            .context(error::ReadSnafu { path })?;
        let objects = parse_manifest(path, &text)?;
        let discovery = Discovery::new(self.client.clone())
            .run()
            .await
            .context(error::DiscoverySnafu)?;
        objects
            .into_iter()
            .map(|object| self.bind(&discovery, path, object))
            .collect()
    }

    fn bind(
        &self,
        discovery: &Discovery,
        path: &Path,
        object: DynamicObject,
    ) -> Result<ManifestObject> {
        let types = object.types.clone().context(error::ManifestFieldSnafu {
            path,
            field: "apiVersion and kind",
        })?;
        let name = object
            .metadata
            .name
            .clone()
            .context(error::ManifestFieldSnafu {
                path,
                field: "metadata.name",
            })?;
        let (group, version) = types
            .api_version
            .split_once('/')
            .unwrap_or(("", types.api_version.as_str()));
        let gvk = GroupVersionKind::gvk(group, version, &types.kind);
        let (resource, capabilities): (ApiResource, ApiCapabilities) = discovery
            .resolve_gvk(&gvk)
            .context(error::UnknownKindSnafu {
                api_version: &types.api_version,
                kind: &types.kind,
            })?;
        let api = match capabilities.scope {
            Scope::Namespaced => {
                let namespace = object
                    .metadata
                    .namespace
                    .as_deref()
                    .unwrap_or(DEFAULT_NAMESPACE);
                Api::namespaced_with(self.client.clone(), namespace, &resource)
            }
            Scope::Cluster => Api::all_with(self.client.clone(), &resource),
        };
        Ok(ManifestObject {
            name,
            kind: types.kind,
            api,
            object,
        })
    }
}

/// Split a multi-document YAML manifest into its objects, skipping empty documents.
fn parse_manifest(path: &Path, text: &str) -> Result<Vec<DynamicObject>> {
    let mut objects = Vec::new();
    for document in serde_yaml::Deserializer::from_str(text) {
        let value = serde_yaml::Value::deserialize(document)
            .context(error::ManifestParseSnafu { path })?;
        if value.is_null() {
            continue;
        }
        objects.push(serde_yaml::from_value(value).context(error::ManifestParseSnafu { path })?);
    }
    Ok(objects)
}

fn is_not_found(error: &kube::Error) -> bool {
    matches!(error, kube::Error::Api(response) if response.code == 404)
}

#[async_trait]
impl K8sClient for KubeClient {
    async fn create_manifest(&self, path: &Path) -> Result<()> {
        for manifest_object in self.manifest_objects(path).await? {
            manifest_object
                .api
                .create(&PostParams::default(), &manifest_object.object)
                .await
                .context(error::KubeApiCallSnafu {
                    method: "create",
                    kind: &manifest_object.kind,
                    name: &manifest_object.name,
                })?;
            info!(
                "Created {} '{}'",
                manifest_object.kind, manifest_object.name
            );
        }
        Ok(())
    }

    async fn delete_manifest(&self, path: &Path) -> Result<()> {
        for manifest_object in self.manifest_objects(path).await? {
            match manifest_object
                .api
                .delete(&manifest_object.name, &DeleteParams::default())
                .await
            {
                Ok(_) => info!(
                    "Deleted {} '{}'",
                    manifest_object.kind, manifest_object.name
                ),
                Err(e) if is_not_found(&e) => debug!(
                    "{} '{}' does not exist",
                    manifest_object.kind, manifest_object.name
                ),
                Err(e) => {
                    return Err(e).context(error::KubeApiCallSnafu {
                        method: "delete",
                        kind: &manifest_object.kind,
                        name: &manifest_object.name,
                    })
                }
            }
        }
        Ok(())
    }
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=
