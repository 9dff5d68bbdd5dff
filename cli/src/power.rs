use crate::Deployment;
use anyhow::{Context, Result};
use bmc::BmcConfig;
use clap::{Parser, Subcommand};

/// Control a server through the Redfish API of its BMC.
#[derive(Debug, Parser)]
pub(crate) struct Bmc {
    /// Address of the BMC. Overrides `bmc.url` of the configuration file.
    #[clap(long = "bmc-url")]
    url: Option<String>,

    #[clap(long = "bmc-user")]
    user: Option<String>,

    #[clap(long = "bmc-password", env = "BMC_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[clap(subcommand)]
    command: BmcCommand,
}

#[derive(Debug, Subcommand)]
enum BmcCommand {
    /// Boot the server once from an ISO served over HTTP.
    BootIso { iso_url: String },
    /// Restart the Redfish service of the BMC.
    RestartRedfish,
    /// Power the server off.
    Stop,
    /// Power the server on.
    Start,
    /// Power the server off and on again.
    ColdBoot,
}

impl Bmc {
    fn config(&self, deployment: &Deployment) -> BmcConfig {
        let mut config = deployment
            .config
            .bmc
            .clone()
            .unwrap_or_else(|| BmcConfig::new(""));
        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(user) = &self.user {
            config.user = user.clone();
        }
        if let Some(password) = &self.password {
            config.password = password.clone();
        }
        config
    }

    pub(crate) async fn run(self, deployment: Deployment) -> Result<()> {
        let config = self.config(&deployment);
        let bmc = bmc::Bmc::from_config(&config).context("Unable to use the BMC")?;
        match self.command {
            BmcCommand::BootIso { iso_url } => bmc
                .boot_iso(&iso_url)
                .await
                .context(format!("Unable to boot '{}' from '{}'", config.url, iso_url)),
            BmcCommand::RestartRedfish => bmc
                .restart_redfish()
                .await
                .context("Unable to restart redfish"),
            BmcCommand::Stop => bmc.stop().await.context("Unable to power off"),
            BmcCommand::Start => bmc.start().await.context("Unable to power on"),
            BmcCommand::ColdBoot => bmc.cold_boot().await.context("Unable to cold boot"),
        }
    }
}
