use crate::Deployment;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Download or remove the kubeconfig and kubeadmin password of a cluster.
#[derive(Debug, Parser)]
pub(crate) struct Credentials {
    #[clap(subcommand)]
    command: CredentialsCommand,
}

#[derive(Debug, Subcommand)]
enum CredentialsCommand {
    Download {
        cluster: String,
        /// Where to put the kubeconfig. The password is written next to it.
        #[clap(long = "kubeconfig")]
        kubeconfig: Option<PathBuf>,
    },
    Delete {
        cluster: String,
        #[clap(long = "kubeconfig")]
        kubeconfig: Option<PathBuf>,
    },
}

impl Credentials {
    pub(crate) async fn run(self, deployment: Deployment) -> Result<()> {
        let driver = deployment.driver()?;
        match self.command {
            CredentialsCommand::Download {
                cluster,
                kubeconfig,
            } => {
                driver
                    .download_credentials(&cluster, kubeconfig.as_deref())
                    .await
                    .context(format!(
                        "Unable to download the credentials of cluster '{}'",
                        cluster
                    ))?;
            }
            CredentialsCommand::Delete {
                cluster,
                kubeconfig,
            } => driver.delete_credentials(&cluster, kubeconfig.as_deref()),
        }
        Ok(())
    }
}
