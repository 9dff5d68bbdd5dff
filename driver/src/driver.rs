use crate::error::{self, Result};
use crate::settings::PollSettings;
use installer_model::clients::InstallerClient;
use installer_model::{
    ClusterInfo, ClusterRecord, ClusterState, CredentialPaths, HostInfo, Interface, Inventory,
    IpRange, ResourceConfig,
};
use log::{debug, error, info, warn};
use serde_json::Value;
use snafu::{OptionExt, ResultExt};
use std::fs;
use std::future::Future;
use std::io::ErrorKind;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;

/// Drives a named cluster and its infra-env through the installer's states and answers
/// point-in-time questions about them.
///
/// # Example
///
/// ```
///# use cluster_driver::ClusterLifecycleDriver;
///# use installer_model::clients::AssistedClient;
///# async fn no_run() {
/// let client = AssistedClient::new("192.168.122.1:8090").unwrap();
/// let driver = ClusterLifecycleDriver::new(client);
/// driver.ensure_cluster_deleted("demo").await.unwrap();
///# }
/// ```
pub struct ClusterLifecycleDriver<C> {
    client: C,
    settings: PollSettings,
    credentials_dir: PathBuf,
}

impl<C> ClusterLifecycleDriver<C>
where
    C: InstallerClient,
{
    pub fn new(client: C) -> Self {
        Self::with_settings(client, PollSettings::default())
    }

    pub fn with_settings(client: C, settings: PollSettings) -> Self {
        Self {
            client,
            settings,
            credentials_dir: PathBuf::from("."),
        }
    }

    /// Set the directory credentials are downloaded to when no explicit kubeconfig path is given.
    pub fn credentials_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.credentials_dir = dir.into();
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    async fn clusters(&self) -> Result<Vec<ClusterRecord>> {
        self.client
            .list_clusters()
            .await
            .context(error::InstallerSnafu {
                what: "list clusters",
            })
    }

    pub async fn cluster_exists(&self, name: &str) -> Result<bool> {
        Ok(self.clusters().await?.iter().any(|cluster| cluster.name == name))
    }

    async fn infra_env_exists(&self, name: &str) -> Result<bool> {
        Ok(self
            .client
            .list_infra_envs()
            .await
            .context(error::InstallerSnafu {
                what: "list infra-envs",
            })?
            .iter()
            .any(|infra_env| infra_env.name == name))
    }

    /// Delete the cluster `name` and wait until the installer no longer lists it. Failed delete
    /// requests are retried every `delete_interval` without limit unless `delete_timeout` is set.
    pub async fn ensure_cluster_deleted(&self, name: &str) -> Result<()> {
        info!("Ensuring that cluster '{}' is not present", name);
        with_deadline(
            self.settings.delete_timeout,
            "delete cluster",
            name,
            self.delete_until_gone(name),
        )
        .await
    }

    async fn delete_until_gone(&self, name: &str) -> Result<()> {
        while self.cluster_exists(name).await? {
            if let Err(e) = self.client.delete_cluster(name).await {
                info!("Failed to delete cluster '{}', will retry: {}", name, e);
            }
            sleep(self.settings.delete_interval).await;
        }
        Ok(())
    }

    pub async fn ensure_cluster_created(&self, name: &str, config: &ResourceConfig) -> Result<()> {
        if self.cluster_exists(name).await? {
            debug!("Cluster '{}' already exists", name);
            return Ok(());
        }
        info!("Creating cluster '{}'", name);
        self.client
            .create_cluster(name, config)
            .await
            .context(error::InstallerSnafu {
                what: format!("create cluster '{}'", name),
            })
    }

    pub async fn ensure_infra_env_created(
        &self,
        name: &str,
        config: &ResourceConfig,
    ) -> Result<()> {
        if self.infra_env_exists(name).await? {
            debug!("Infra-env '{}' already exists", name);
            return Ok(());
        }
        info!("Creating infra-env '{}'", name);
        self.client
            .create_infra_env(name, config)
            .await
            .context(error::InstallerSnafu {
                what: format!("create infra-env '{}'", name),
            })
    }

    pub async fn ensure_infra_env_deleted(&self, name: &str) -> Result<()> {
        if !self.infra_env_exists(name).await? {
            debug!("Infra-env '{}' is not present", name);
            return Ok(());
        }
        info!("Deleting infra-env '{}'", name);
        self.client
            .delete_infra_env(name)
            .await
            .context(error::InstallerSnafu {
                what: format!("delete infra-env '{}'", name),
            })
    }

    /// Download the kubeconfig and kubeadmin password of a cluster. The installer always names
    /// the kubeconfig after the cluster, so it is renamed when `kubeconfig` asks for another path.
    pub async fn download_credentials(
        &self,
        name: &str,
        kubeconfig: Option<&Path>,
    ) -> Result<CredentialPaths> {
        let paths = CredentialPaths::resolve(name, kubeconfig, &self.credentials_dir);
        let downloaded_kubeconfig = self
            .client
            .download_kubeconfig(name, &paths.directory)
            .await
            .context(error::InstallerSnafu {
                what: format!("download the kubeconfig of cluster '{}'", name),
            })?;
        let kubeadmin_password = self
            .client
            .download_kubeadmin_password(name, &paths.directory)
            .await
            .context(error::InstallerSnafu {
                what: format!("download the kubeadmin password of cluster '{}'", name),
            })?;

        if downloaded_kubeconfig != paths.kubeconfig {
            fs::rename(&downloaded_kubeconfig, &paths.kubeconfig).context(
                error::RenameSnafu {
                    from: downloaded_kubeconfig.clone(),
                    to: paths.kubeconfig.clone(),
                },
            )?;
        }

        let paths = CredentialPaths {
            downloaded_kubeconfig,
            kubeadmin_password,
            ..paths
        };
        info!("KUBECONFIG={}", paths.kubeconfig.display());
        info!("KUBEADMIN_PASSWD={}", paths.kubeadmin_password.display());
        Ok(paths)
    }

    /// Remove the credential files of a cluster. Files that are already gone are fine, any other
    /// failure is only logged.
    pub fn delete_credentials(&self, name: &str, kubeconfig: Option<&Path>) {
        let paths = CredentialPaths::resolve(name, kubeconfig, &self.credentials_dir);
        for path in [&paths.kubeconfig, &paths.kubeadmin_password] {
            match fs::remove_file(path) {
                Ok(()) => debug!("Removed '{}'", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("Unable to remove '{}': {}", path.display(), e),
            }
        }
    }

    /// Download the discovery ISO of `infra_env` into `dir`, retrying up to `iso_attempts` times.
    /// Running out of attempts is logged and reported as `None` rather than as an error.
    pub async fn download_iso_with_retry(
        &self,
        infra_env: &str,
        dir: &Path,
    ) -> Result<Option<PathBuf>> {
        let details = self
            .client
            .infra_env_details(infra_env)
            .await
            .context(error::InstallerSnafu {
                what: format!("get infra-env '{}'", infra_env),
            })?;
        info!("{}", details);

        let attempts = self.settings.iso_attempts;
        let delay = self.settings.iso_retry_delay;
        info!(
            "Downloading the ISO of infra-env '{}' to '{}', retrying for {:?}",
            infra_env,
            dir.display(),
            delay * attempts
        );
        for attempt in 1..=attempts {
            match self.client.download_iso(infra_env, dir).await {
                Ok(path) => {
                    info!("Downloaded the ISO to '{}'", path.display());
                    return Ok(Some(path));
                }
                Err(e) => {
                    debug!("ISO download attempt {}/{} failed: {}", attempt, attempts, e);
                    sleep(delay).await;
                }
            }
        }
        error!("Failed to download the ISO after {} attempts", attempts);
        Ok(None)
    }

    /// The state of the one cluster named `name`. No match, several matches, or a missing or
    /// non-string status are errors.
    pub async fn cluster_state(&self, name: &str) -> Result<ClusterState> {
        let matching: Vec<ClusterRecord> = self
            .clusters()
            .await?
            .into_iter()
            .filter(|cluster| cluster.name == name)
            .collect();
        match matching.as_slice() {
            [] => error::ClusterNotFoundSnafu { name }.fail(),
            [cluster] => match &cluster.status {
                Some(Value::String(status)) => Ok(ClusterState::new(status.as_str())),
                Some(other) => error::UnexpectedStatusSnafu {
                    name,
                    status: other.to_string(),
                }
                .fail(),
                None => error::MissingStatusSnafu { name }.fail(),
            },
            clusters => error::AmbiguousClusterSnafu {
                name,
                count: clusters.len(),
            }
            .fail(),
        }
    }

    /// Poll the state of a cluster until it is `ready`. Returns the states in the order they
    /// were observed, each state once per transition.
    pub async fn wait_cluster_ready(&self, name: &str) -> Result<Vec<ClusterState>> {
        info!("Waiting for cluster '{}' to be ready", name);
        with_deadline(
            self.settings.ready_timeout,
            "wait for readiness of cluster",
            name,
            self.poll_until_ready(name),
        )
        .await
    }

    async fn poll_until_ready(&self, name: &str) -> Result<Vec<ClusterState>> {
        let mut transitions: Vec<ClusterState> = Vec::new();
        loop {
            let state = self.cluster_state(name).await?;
            if transitions.last() != Some(&state) {
                info!("Cluster '{}' state changed to {}", name, state);
                transitions.push(state.clone());
            }
            if state.is_ready() {
                return Ok(transitions);
            }
            sleep(self.settings.state_interval).await;
        }
    }

    /// Wait for the cluster to be ready, then keep asking the installer to start it until it
    /// reports `installing`. Returns the number of start requests sent.
    pub async fn start_until_installing(&self, name: &str) -> Result<u64> {
        self.wait_cluster_ready(name).await?;
        info!("Starting cluster '{}' (will retry until it is installing)", name);
        let attempts = with_deadline(
            self.settings.install_timeout,
            "start cluster",
            name,
            self.start_until_state(name),
        )
        .await?;
        info!("Took {} tries to start cluster '{}'", attempts, name);
        Ok(attempts)
    }

    async fn start_until_state(&self, name: &str) -> Result<u64> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            // Start requests are rejected while the cluster settles, only the state counts.
            if let Err(e) = self.client.start_cluster(name).await {
                debug!("Start request for cluster '{}' failed: {}", name, e);
            }
            if self.cluster_state(name).await?.is_installing() {
                info!("Cluster '{}' is in state installing", name);
                return Ok(attempts);
            }
            sleep(self.settings.state_interval).await;
        }
    }

    /// The status and inventory of the host that requested `hostname`. Hosts that have not
    /// reported an inventory yet are skipped.
    pub async fn host(&self, hostname: &str) -> Result<Option<HostInfo>> {
        Ok(self
            .client
            .list_hosts()
            .await
            .context(error::InstallerSnafu { what: "list hosts" })?
            .into_iter()
            .filter_map(|host| {
                let inventory = host.inventory?;
                Some(HostInfo {
                    hostname: host.requested_hostname,
                    status: host.status,
                    inventory,
                })
            })
            .find(|host| host.hostname == hostname))
    }

    /// The address `hostname` uses on its default route, if it lies within `range`.
    pub async fn resolve_host_ip(&self, hostname: &str, range: &IpRange) -> Result<Option<IpAddr>> {
        let host = match self.host(hostname).await? {
            Some(host) => host,
            None => {
                debug!("No host named '{}' has reported an inventory", hostname);
                return Ok(None);
            }
        };
        let inventory = host.parse_inventory().context(error::InventorySnafu)?;
        Ok(select_address(&inventory, range))
    }

    /// The id and API VIP of a cluster. A missing id or an empty VIP list are errors.
    pub async fn cluster_info(&self, name: &str) -> Result<ClusterInfo> {
        let details = self
            .client
            .cluster_details(name)
            .await
            .context(error::InstallerSnafu {
                what: format!("get cluster '{}'", name),
            })?;
        let id = details
            .id
            .filter(|id| !id.is_empty())
            .context(error::MissingClusterIdSnafu { name })?;
        let api_vip = details
            .api_vips
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|vip| vip.ip)
            .context(error::MissingApiVipSnafu { name })?;
        Ok(ClusterInfo { id, api_vip })
    }

    pub async fn allow_add_workers(&self, name: &str) -> Result<()> {
        let info = self.cluster_info(name).await?;
        info!("Allowing workers to be added to cluster '{}'", name);
        self.client
            .allow_add_workers(&info.id)
            .await
            .context(error::InstallerSnafu {
                what: format!("allow adding workers to cluster '{}'", name),
            })
    }
}

/// Pick the first address, in default-route order, of an interface carrying a default route that
/// lies within `range`.
pub fn select_address(inventory: &Inventory, range: &IpRange) -> Option<IpAddr> {
    inventory
        .default_route_interfaces()
        .filter_map(|name| inventory.interface(name))
        .filter_map(Interface::first_ipv4)
        .find(|address| range.contains(address))
}

/// Run `future` to completion, or until `deadline` elapses when one is given.
async fn with_deadline<F, T>(
    deadline: Option<Duration>,
    operation: &str,
    name: &str,
    future: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match deadline {
        None => future.await,
        Some(after) => tokio::time::timeout(after, future)
            .await
            .context(error::TimeoutSnafu {
                operation,
                name,
                after,
            })?,
    }
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

#[cfg(test)]
mod test {
    use super::*;
    use installer_model::Route;

    fn inventory(address: &str) -> Inventory {
        Inventory {
            routes: vec![
                Route {
                    destination: "10.1.0.0".to_string(),
                    interface: "eth1".to_string(),
                },
                Route {
                    destination: "0.0.0.0".to_string(),
                    interface: "eth0".to_string(),
                },
            ],
            interfaces: vec![
                Interface {
                    name: "eth1".to_string(),
                    ipv4_addresses: vec!["10.1.0.7/16".to_string()],
                },
                Interface {
                    name: "eth0".to_string(),
                    ipv4_addresses: vec![address.to_string()],
                },
            ],
        }
    }

    #[test]
    fn address_in_range() {
        let range = "10.0.0.0-10.0.0.255".parse().unwrap();
        assert_eq!(
            select_address(&inventory("10.0.0.5/24"), &range),
            Some("10.0.0.5".parse().unwrap())
        );
    }

    #[test]
    fn address_out_of_range() {
        let range = "192.168.0.0-192.168.0.255".parse().unwrap();
        assert_eq!(select_address(&inventory("10.0.0.5/24"), &range), None);
    }

    #[test]
    fn only_default_routes_count() {
        let range = "10.1.0.0-10.1.255.255".parse().unwrap();
        assert_eq!(select_address(&inventory("10.0.0.5/24"), &range), None);
    }

    #[test]
    fn default_route_without_interface_record() {
        let mut inventory = inventory("10.0.0.5/24");
        inventory.interfaces.clear();
        let range = "10.0.0.0-10.0.0.255".parse().unwrap();
        assert_eq!(select_address(&inventory, &range), None);
    }

    #[tokio::test]
    async fn deadline_elapses() {
        let result: Result<()> = with_deadline(
            Some(Duration::from_millis(10)),
            "wait for",
            "demo",
            async {
                sleep(Duration::from_secs(60)).await;
                Ok(())
            },
        )
        .await;
        assert!(matches!(result, Err(error::Error::Timeout { .. })));
    }
}
