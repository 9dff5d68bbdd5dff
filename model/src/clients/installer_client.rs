use super::error::Result;
use crate::{ClusterRecord, HostRecord, InfraEnvRecord, ResourceConfig};
use std::path::{Path, PathBuf};

/// `InstallerClient` is the capability of talking to the assisted installer. Clusters and
/// infra-envs are addressed by name; implementations resolve names to installer ids.
///
/// This is provided as a trait so that mock implementations can be injected into the cluster
/// driver for testing purposes.
#[async_trait::async_trait]
pub trait InstallerClient: Send + Sync {
    /// List every cluster known to the installer.
    async fn list_clusters(&self) -> Result<Vec<ClusterRecord>>;

    async fn create_cluster(&self, name: &str, config: &ResourceConfig) -> Result<()>;

    async fn delete_cluster(&self, name: &str) -> Result<()>;

    /// Fetch the full record of a cluster, including its API VIPs.
    async fn cluster_details(&self, name: &str) -> Result<ClusterRecord>;

    /// Ask the installer to start installing a cluster. The installer may refuse while the
    /// cluster is still settling.
    async fn start_cluster(&self, name: &str) -> Result<()>;

    /// Allow day-2 workers to be added to an installed cluster.
    async fn allow_add_workers(&self, cluster_id: &str) -> Result<()>;

    async fn list_infra_envs(&self) -> Result<Vec<InfraEnvRecord>>;

    async fn create_infra_env(&self, name: &str, config: &ResourceConfig) -> Result<()>;

    async fn delete_infra_env(&self, name: &str) -> Result<()>;

    /// Fetch the full installer document of an infra-env.
    async fn infra_env_details(&self, name: &str) -> Result<serde_json::Value>;

    /// List the hosts registered with every infra-env.
    async fn list_hosts(&self) -> Result<Vec<HostRecord>>;

    /// Download the discovery ISO of an infra-env into `dir`, returning the path written.
    async fn download_iso(&self, infra_env: &str, dir: &Path) -> Result<PathBuf>;

    /// Download the kubeconfig of a cluster into `dir` as `kubeconfig.<cluster>`.
    async fn download_kubeconfig(&self, cluster: &str, dir: &Path) -> Result<PathBuf>;

    /// Download the kubeadmin password of a cluster into `dir` as `kubeadmin-password.<cluster>`.
    async fn download_kubeadmin_password(&self, cluster: &str, dir: &Path) -> Result<PathBuf>;
}
