use super::error::{self, Result};
use super::InstallerClient;
use crate::constants::{API_PREFIX, DEFAULT_SCHEME, ISO_FILE_EXTENSION};
use crate::credentials::{kubeadmin_password_file_name, kubeconfig_file_name};
use crate::{ClusterRecord, HostRecord, InfraEnvRecord, ResourceConfig};
use log::{debug, trace};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use snafu::{OptionExt, ResultExt};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use url::Url;

/// An [`InstallerClient`] for the assisted installer v2 REST API.
///
/// # Example
///
/// ```
///# use installer_model::clients::{AssistedClient, InstallerClient};
///# async fn no_run() {
/// let client = AssistedClient::new("192.168.122.1:8090").unwrap();
/// let clusters = client.list_clusters().await.unwrap();
///# }
/// ```
#[derive(Clone, Debug)]
pub struct AssistedClient {
    base_url: Url,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct PresignedUrl {
    url: String,
}

impl AssistedClient {
    /// Create a client for the installer at `address`, either `host:port` (plain HTTP is assumed)
    /// or a full URL.
    pub fn new(address: &str) -> Result<Self> {
        let with_scheme = if address.contains("://") {
            address.to_string()
        } else {
            format!("{}://{}", DEFAULT_SCHEME, address)
        };
        let mut root = Url::parse(&with_scheme).context(error::InvalidUrlSnafu { url: address })?;
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        let base_url = root
            .join(API_PREFIX)
            .context(error::InvalidUrlSnafu { url: address })?;
        let http = reqwest::Client::builder()
            .build()
            .context(error::BuildSnafu)?;
        Ok(Self { base_url, http })
    }

    /// The URL every endpoint is relative to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .context(error::InvalidUrlSnafu { url: path })
    }

    /// Send a request and turn any non-2xx answer into an error carrying the body.
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request.send().await.context(error::RequestSnafu { what })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        error::StatusSnafu {
            what,
            status: status.as_u16(),
            body,
        }
        .fail()
    }

    async fn get_json<T>(&self, path: &str, what: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        trace!("GET {}", url);
        self.send(self.http.get(url), what)
            .await?
            .json()
            .await
            .context(error::DecodeSnafu { what })
    }

    async fn post(&self, path: &str, body: Option<&Value>, what: &str) -> Result<()> {
        let url = self.endpoint(path)?;
        trace!("POST {}", url);
        let request = match body {
            Some(body) => self.http.post(url).json(body),
            None => self.http.post(url),
        };
        self.send(request, what).await?;
        Ok(())
    }

    async fn delete(&self, path: &str, what: &str) -> Result<()> {
        let url = self.endpoint(path)?;
        trace!("DELETE {}", url);
        self.send(self.http.delete(url), what).await?;
        Ok(())
    }

    async fn cluster_id(&self, name: &str) -> Result<String> {
        self.list_clusters()
            .await?
            .into_iter()
            .find(|cluster| cluster.name == name)
            .context(error::NotFoundSnafu {
                kind: "cluster",
                name,
            })?
            .id
            .context(error::MissingFieldSnafu {
                what: format!("cluster '{}'", name),
                field: "id",
            })
    }

    async fn infra_env_id(&self, name: &str) -> Result<String> {
        self.list_infra_envs()
            .await?
            .into_iter()
            .find(|infra_env| infra_env.name == name)
            .context(error::NotFoundSnafu {
                kind: "infra-env",
                name,
            })?
            .id
            .context(error::MissingFieldSnafu {
                what: format!("infra-env '{}'", name),
                field: "id",
            })
    }

    /// Stream the body at `url` into `destination`.
    async fn download(&self, url: Url, destination: PathBuf, what: &str) -> Result<PathBuf> {
        debug!("Downloading {} to '{}'", what, destination.display());
        let mut response = self.send(self.http.get(url), what).await?;
        let mut file = tokio::fs::File::create(&destination)
            .await
            .context(error::CreateFileSnafu {
                path: destination.clone(),
            })?;
        while let Some(chunk) = response
            .chunk()
            .await
            .context(error::RequestSnafu { what })?
        {
            file.write_all(&chunk)
                .await
                .context(error::WriteFileSnafu {
                    path: destination.clone(),
                })?;
        }
        file.flush().await.context(error::WriteFileSnafu {
            path: destination.clone(),
        })?;
        Ok(destination)
    }

    async fn download_credential(
        &self,
        cluster: &str,
        file_name: &str,
        destination: PathBuf,
    ) -> Result<PathBuf> {
        let id = self.cluster_id(cluster).await?;
        let mut url = self.endpoint(&format!("clusters/{}/downloads/credentials", id))?;
        url.query_pairs_mut().append_pair("file_name", file_name);
        self.download(
            url,
            destination,
            &format!("download {} of cluster '{}'", file_name, cluster),
        )
        .await
    }
}

/// Build the creation body of a cluster or infra-env from its name and free-form parameters.
fn creation_body(name: &str, config: &ResourceConfig) -> Value {
    let mut body = config.clone();
    body.insert("name".to_string(), Value::String(name.to_string()));
    Value::Object(body)
}

#[async_trait::async_trait]
impl InstallerClient for AssistedClient {
    async fn list_clusters(&self) -> Result<Vec<ClusterRecord>> {
        self.get_json("clusters", "list clusters").await
    }

    async fn create_cluster(&self, name: &str, config: &ResourceConfig) -> Result<()> {
        self.post(
            "clusters",
            Some(&creation_body(name, config)),
            &format!("create cluster '{}'", name),
        )
        .await
    }

    async fn delete_cluster(&self, name: &str) -> Result<()> {
        let id = self.cluster_id(name).await?;
        self.delete(
            &format!("clusters/{}", id),
            &format!("delete cluster '{}'", name),
        )
        .await
    }

    async fn cluster_details(&self, name: &str) -> Result<ClusterRecord> {
        let id = self.cluster_id(name).await?;
        self.get_json(
            &format!("clusters/{}", id),
            &format!("get cluster '{}'", name),
        )
        .await
    }

    async fn start_cluster(&self, name: &str) -> Result<()> {
        let id = self.cluster_id(name).await?;
        self.post(
            &format!("clusters/{}/actions/install", id),
            None,
            &format!("start cluster '{}'", name),
        )
        .await
    }

    async fn allow_add_workers(&self, cluster_id: &str) -> Result<()> {
        self.post(
            &format!("clusters/{}/actions/allow-add-workers", cluster_id),
            None,
            &format!("allow adding workers to cluster '{}'", cluster_id),
        )
        .await
    }

    async fn list_infra_envs(&self) -> Result<Vec<InfraEnvRecord>> {
        self.get_json("infra-envs", "list infra-envs").await
    }

    async fn create_infra_env(&self, name: &str, config: &ResourceConfig) -> Result<()> {
        let mut config = config.clone();
        // The installer wants the id of the cluster the infra-env belongs to, callers name it.
        if let Some(Value::String(cluster)) = config.remove("cluster") {
            let id = self.cluster_id(&cluster).await?;
            config.insert("cluster_id".to_string(), Value::String(id));
        }
        self.post(
            "infra-envs",
            Some(&creation_body(name, &config)),
            &format!("create infra-env '{}'", name),
        )
        .await
    }

    async fn delete_infra_env(&self, name: &str) -> Result<()> {
        let id = self.infra_env_id(name).await?;
        self.delete(
            &format!("infra-envs/{}", id),
            &format!("delete infra-env '{}'", name),
        )
        .await
    }

    async fn infra_env_details(&self, name: &str) -> Result<Value> {
        let id = self.infra_env_id(name).await?;
        self.get_json(
            &format!("infra-envs/{}", id),
            &format!("get infra-env '{}'", name),
        )
        .await
    }

    async fn list_hosts(&self) -> Result<Vec<HostRecord>> {
        let mut hosts = Vec::new();
        for infra_env in self.list_infra_envs().await? {
            let id = match infra_env.id {
                Some(id) => id,
                None => continue,
            };
            let mut infra_env_hosts: Vec<HostRecord> = self
                .get_json(
                    &format!("infra-envs/{}/hosts", id),
                    &format!("list hosts of infra-env '{}'", infra_env.name),
                )
                .await?;
            hosts.append(&mut infra_env_hosts);
        }
        Ok(hosts)
    }

    async fn download_iso(&self, infra_env: &str, dir: &Path) -> Result<PathBuf> {
        let id = self.infra_env_id(infra_env).await?;
        let presigned: PresignedUrl = self
            .get_json(
                &format!("infra-envs/{}/downloads/image-url", id),
                &format!("get the ISO URL of infra-env '{}'", infra_env),
            )
            .await?;
        let url = Url::parse(&presigned.url).context(error::InvalidUrlSnafu {
            url: &presigned.url,
        })?;
        self.download(
            url,
            dir.join(format!("{}.{}", infra_env, ISO_FILE_EXTENSION)),
            &format!("download the ISO of infra-env '{}'", infra_env),
        )
        .await
    }

    async fn download_kubeconfig(&self, cluster: &str, dir: &Path) -> Result<PathBuf> {
        self.download_credential(cluster, "kubeconfig", dir.join(kubeconfig_file_name(cluster)))
            .await
    }

    async fn download_kubeadmin_password(&self, cluster: &str, dir: &Path) -> Result<PathBuf> {
        self.download_credential(
            cluster,
            "kubeadmin-password",
            dir.join(kubeadmin_password_file_name(cluster)),
        )
        .await
    }
}
