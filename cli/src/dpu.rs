use anyhow::{Context, Result};
use clap::Parser;
use dpu_plugins::{select_vendor_plugin, Host, K8sClient, KubeClient, LocalHost, RemoteHost};
use std::path::PathBuf;

/// Build the vendor plugin of the DPUs on a build host and (re)deploy it as a DaemonSet.
#[derive(Debug, Parser)]
pub(crate) struct Dpu {
    /// Registry the plugin image is pushed to and pulled from.
    #[clap(long = "registry")]
    registry: String,

    /// Address of the build host. The plugin is built locally when omitted.
    #[clap(long = "build-host")]
    build_host: Option<String>,

    /// SSH user on the build host.
    #[clap(long = "ssh-user", default_value = "root")]
    ssh_user: String,

    /// SSH private key for the build host.
    #[clap(long = "ssh-key")]
    ssh_key: Option<PathBuf>,

    /// Kubeconfig of the cluster the plugin runs on. Also can be passed with the KUBECONFIG
    /// environment variable.
    #[clap(long = "kubeconfig")]
    kubeconfig: Option<PathBuf>,
}

impl Dpu {
    pub(crate) async fn run(self) -> Result<()> {
        let client = match &self.kubeconfig {
            Some(path) => KubeClient::from_kubeconfig_path(path)
                .await
                .context(format!(
                    "Unable to create k8s client from path '{}'",
                    path.display()
                ))?,
            None => KubeClient::try_default()
                .await
                .context("Unable to create default k8s client")?,
        };
        match &self.build_host {
            Some(address) => {
                let host =
                    RemoteHost::connect(address, &self.ssh_user, self.ssh_key.as_deref())
                        .await
                        .context(format!("Unable to connect to build host '{}'", address))?;
                let result = self.deploy(&host, &client).await;
                if let Err(e) = host.close().await {
                    log::warn!("Unable to close the session to '{}': {}", address, e);
                }
                result
            }
            None => {
                let host = LocalHost::new().context("Unable to use the local host")?;
                self.deploy(&host, &client).await
            }
        }
    }

    async fn deploy(&self, host: &dyn Host, client: &dyn K8sClient) -> Result<()> {
        let plugin = select_vendor_plugin(host);
        plugin
            .build_and_start(host, client, &self.registry)
            .await
            .context(format!(
                "Unable to build and start the vendor plugin from '{}'",
                plugin.repo()
            ))
    }
}
