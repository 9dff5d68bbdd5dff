use crate::Deployment;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

/// Create, delete, start and inspect clusters.
#[derive(Debug, Parser)]
pub(crate) struct Cluster {
    #[clap(subcommand)]
    command: ClusterCommand,
}

#[derive(Debug, Subcommand)]
enum ClusterCommand {
    /// Create the cluster unless it exists, with the parameters of the configuration file.
    Create { name: String },
    /// Delete the cluster, retrying until the installer no longer lists it.
    Delete { name: String },
    /// Print the current state of the cluster.
    State { name: String },
    /// Wait until the cluster is ready to be installed.
    WaitReady { name: String },
    /// Wait until the cluster is ready, then start its installation.
    Start { name: String },
    /// Print the id and API VIP of the cluster as JSON.
    Info { name: String },
    /// Allow workers to be added to an installed cluster.
    AllowAddWorkers { name: String },
}

impl Cluster {
    pub(crate) async fn run(self, deployment: Deployment) -> Result<()> {
        let driver = deployment.driver()?;
        match self.command {
            ClusterCommand::Create { name } => driver
                .ensure_cluster_created(&name, &deployment.config.cluster)
                .await
                .context(format!("Unable to create cluster '{}'", name)),
            ClusterCommand::Delete { name } => driver
                .ensure_cluster_deleted(&name)
                .await
                .context(format!("Unable to delete cluster '{}'", name)),
            ClusterCommand::State { name } => {
                let state = driver
                    .cluster_state(&name)
                    .await
                    .context(format!("Unable to get the state of cluster '{}'", name))?;
                println!("{}", state);
                Ok(())
            }
            ClusterCommand::WaitReady { name } => {
                driver
                    .wait_cluster_ready(&name)
                    .await
                    .context(format!("Cluster '{}' did not become ready", name))?;
                Ok(())
            }
            ClusterCommand::Start { name } => {
                driver
                    .start_until_installing(&name)
                    .await
                    .context(format!("Unable to start cluster '{}'", name))?;
                Ok(())
            }
            ClusterCommand::Info { name } => {
                let info = driver
                    .cluster_info(&name)
                    .await
                    .context(format!("Unable to get cluster '{}'", name))?;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&info)
                        .context("Could not create string from cluster info.")?
                );
                Ok(())
            }
            ClusterCommand::AllowAddWorkers { name } => driver
                .allow_add_workers(&name)
                .await
                .context(format!("Unable to allow adding workers to '{}'", name)),
        }
    }
}
