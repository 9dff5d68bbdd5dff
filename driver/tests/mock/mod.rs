/*!

This test module provides a mock implementation of the [`InstallerClient`] that demonstrates what
can be done to test the cluster driver without an installer.

The mock keeps its clusters, infra-envs and hosts in memory. Installer behavior that the driver
has to cope with (flaky deletes, rejected start requests, failing downloads, a cluster moving
through states) is scripted through [`MockState`].

!*/

use installer_model::clients::{Error, InstallerClient, Result};
use installer_model::{ClusterRecord, HostRecord, InfraEnvRecord, ResourceConfig};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub(crate) struct MockState {
    pub(crate) clusters: Vec<ClusterRecord>,
    pub(crate) infra_envs: Vec<InfraEnvRecord>,
    pub(crate) hosts: Vec<HostRecord>,
    /// The status reported for the first cluster by successive listings. The last entry repeats.
    pub(crate) status_script: VecDeque<String>,
    /// How many delete requests fail before one succeeds.
    pub(crate) delete_failures: usize,
    /// How many start requests are rejected before the cluster starts installing.
    pub(crate) start_failures: usize,
    /// How many ISO downloads fail before one succeeds.
    pub(crate) iso_failures: usize,
    pub(crate) calls: Calls,
}

/// What the driver asked of the installer.
#[derive(Clone, Debug, Default)]
pub(crate) struct Calls {
    pub(crate) list_clusters: usize,
    pub(crate) delete_cluster: usize,
    pub(crate) create_cluster: usize,
    pub(crate) create_infra_env: usize,
    pub(crate) delete_infra_env: usize,
    pub(crate) start_cluster: usize,
    pub(crate) download_iso: usize,
    pub(crate) allow_add_workers: Vec<String>,
}

pub(crate) struct MockInstallerClient {
    state: Mutex<MockState>,
}

impl MockInstallerClient {
    pub(crate) fn new(state: MockState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub(crate) fn calls(&self) -> Calls {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn cluster_names(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .clusters
            .iter()
            .map(|cluster| cluster.name.clone())
            .collect()
    }
}

fn unavailable(what: &str) -> Error {
    Error::Status {
        what: what.to_string(),
        status: 503,
        body: "service unavailable".to_string(),
    }
}

fn not_found(kind: &str, name: &str) -> Error {
    Error::NotFound {
        kind: kind.to_string(),
        name: name.to_string(),
    }
}

fn write(path: PathBuf, content: &str) -> Result<PathBuf> {
    std::fs::write(&path, content).map_err(|source| Error::WriteFile {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

#[async_trait::async_trait]
impl InstallerClient for MockInstallerClient {
    async fn list_clusters(&self) -> Result<Vec<ClusterRecord>> {
        let mut state = self.state.lock().unwrap();
        state.calls.list_clusters += 1;
        let scripted = if state.status_script.len() > 1 {
            state.status_script.pop_front()
        } else {
            state.status_script.front().cloned()
        };
        if let (Some(status), Some(cluster)) = (scripted, state.clusters.first_mut()) {
            cluster.status = Some(Value::String(status));
        }
        Ok(state.clusters.clone())
    }

    async fn create_cluster(&self, name: &str, _config: &ResourceConfig) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.create_cluster += 1;
        state
            .clusters
            .push(ClusterRecord::new(name).with_status("insufficient"));
        Ok(())
    }

    async fn delete_cluster(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.delete_cluster += 1;
        if state.delete_failures > 0 {
            state.delete_failures -= 1;
            return Err(unavailable("delete cluster"));
        }
        let before = state.clusters.len();
        state.clusters.retain(|cluster| cluster.name != name);
        if state.clusters.len() == before {
            return Err(not_found("cluster", name));
        }
        Ok(())
    }

    async fn cluster_details(&self, name: &str) -> Result<ClusterRecord> {
        self.state
            .lock()
            .unwrap()
            .clusters
            .iter()
            .find(|cluster| cluster.name == name)
            .cloned()
            .ok_or_else(|| not_found("cluster", name))
    }

    async fn start_cluster(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.start_cluster += 1;
        if state.start_failures > 0 {
            state.start_failures -= 1;
            return Err(unavailable("start cluster"));
        }
        state.status_script.clear();
        let cluster = state
            .clusters
            .iter_mut()
            .find(|cluster| cluster.name == name)
            .ok_or_else(|| not_found("cluster", name))?;
        cluster.status = Some(json!("installing"));
        Ok(())
    }

    async fn allow_add_workers(&self, cluster_id: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .calls
            .allow_add_workers
            .push(cluster_id.to_string());
        Ok(())
    }

    async fn list_infra_envs(&self) -> Result<Vec<InfraEnvRecord>> {
        Ok(self.state.lock().unwrap().infra_envs.clone())
    }

    async fn create_infra_env(&self, name: &str, _config: &ResourceConfig) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.create_infra_env += 1;
        state.infra_envs.push(InfraEnvRecord {
            name: name.to_string(),
            id: Some(format!("{}-id", name)),
        });
        Ok(())
    }

    async fn delete_infra_env(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.delete_infra_env += 1;
        state.infra_envs.retain(|infra_env| infra_env.name != name);
        Ok(())
    }

    async fn infra_env_details(&self, name: &str) -> Result<Value> {
        Ok(json!({"name": name, "type": "full-iso"}))
    }

    async fn list_hosts(&self) -> Result<Vec<HostRecord>> {
        Ok(self.state.lock().unwrap().hosts.clone())
    }

    async fn download_iso(&self, infra_env: &str, dir: &Path) -> Result<PathBuf> {
        {
            let mut state = self.state.lock().unwrap();
            state.calls.download_iso += 1;
            if state.iso_failures > 0 {
                state.iso_failures -= 1;
                return Err(unavailable("download the ISO"));
            }
        }
        write(dir.join(format!("{}.iso", infra_env)), "iso")
    }

    async fn download_kubeconfig(&self, cluster: &str, dir: &Path) -> Result<PathBuf> {
        write(
            dir.join(format!("kubeconfig.{}", cluster)),
            "apiVersion: v1\nkind: Config\n",
        )
    }

    async fn download_kubeadmin_password(&self, cluster: &str, dir: &Path) -> Result<PathBuf> {
        write(dir.join(format!("kubeadmin-password.{}", cluster)), "secret")
    }
}
