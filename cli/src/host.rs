use crate::Deployment;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use installer_model::IpRange;

/// Inspect hosts that registered with the installer.
#[derive(Debug, Parser)]
pub(crate) struct Host {
    #[clap(subcommand)]
    command: HostCommand,
}

#[derive(Debug, Subcommand)]
enum HostCommand {
    /// Print the status of a host.
    Status { hostname: String },
    /// Print the address of a host's default route interface that lies in a range.
    Ip {
        hostname: String,
        /// Inclusive range, `START-END`.
        #[clap(long = "range")]
        range: IpRange,
    },
}

impl Host {
    pub(crate) async fn run(self, deployment: Deployment) -> Result<()> {
        let driver = deployment.driver()?;
        match self.command {
            HostCommand::Status { hostname } => {
                let host = driver
                    .host(&hostname)
                    .await
                    .context(format!("Unable to get host '{}'", hostname))?
                    .context(format!("Host '{}' has not reported an inventory", hostname))?;
                println!("{}", host.status);
            }
            HostCommand::Ip { hostname, range } => {
                let address = driver
                    .resolve_host_ip(&hostname, &range)
                    .await
                    .context(format!("Unable to resolve the address of '{}'", hostname))?
                    .context(format!("Host '{}' has no address in {}", hostname, range))?;
                println!("{}", address);
            }
        }
        Ok(())
    }
}
