use crate::Deployment;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

/// Create and delete infra-envs.
#[derive(Debug, Parser)]
pub(crate) struct InfraEnv {
    #[clap(subcommand)]
    command: InfraEnvCommand,
}

#[derive(Debug, Subcommand)]
enum InfraEnvCommand {
    /// Create the infra-env unless it exists, with the parameters of the configuration file.
    Create {
        name: String,
        /// The cluster the infra-env belongs to. Overrides `infraEnv.cluster` of the
        /// configuration file.
        #[clap(long = "cluster")]
        cluster: Option<String>,
    },
    /// Delete the infra-env if it exists.
    Delete { name: String },
}

impl InfraEnv {
    pub(crate) async fn run(self, deployment: Deployment) -> Result<()> {
        let driver = deployment.driver()?;
        match self.command {
            InfraEnvCommand::Create { name, cluster } => {
                let mut config = deployment.config.infra_env.clone();
                if let Some(cluster) = cluster {
                    config.insert("cluster".to_string(), serde_json::Value::String(cluster));
                }
                driver
                    .ensure_infra_env_created(&name, &config)
                    .await
                    .context(format!("Unable to create infra-env '{}'", name))
            }
            InfraEnvCommand::Delete { name } => driver
                .ensure_infra_env_deleted(&name)
                .await
                .context(format!("Unable to delete infra-env '{}'", name)),
        }
    }
}
