/*!

`cda` drives an assisted-installer deployment: it creates and deletes clusters and infra-envs,
fetches discovery ISOs and credentials, waits for installation, boots servers through their BMC
and deploys the DPU vendor plugin.

!*/

mod cluster;
mod config;
mod credentials;
mod dpu;
mod host;
mod infra_env;
mod iso;
mod power;

use anyhow::{Context, Result};
use clap::Parser;
use cluster_driver::ClusterLifecycleDriver;
use config::DeploymentConfig;
use env_logger::Builder;
use installer_model::clients::AssistedClient;
use log::{error, LevelFilter};
use std::path::PathBuf;

/// The default installer address, as served by a local assisted-service pod.
const DEFAULT_INSTALLER_URL: &str = "localhost:8090";

/// Log targets filtered by `--log-level`.
const LOG_TARGETS: &[&str] = &[
    env!("CARGO_CRATE_NAME"),
    "installer_model",
    "cluster_driver",
    "dpu_plugins",
    "bmc",
];

/// The command line interface for deploying clusters with the assisted installer.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[clap(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    /// Address of the assisted installer, `host:port` or a URL. Defaults to the value in the
    /// configuration file, then to `localhost:8090`.
    #[clap(long = "installer-url", env = "ASSISTED_INSTALLER_URL")]
    installer_url: Option<String>,
    /// Path to a YAML deployment configuration.
    #[clap(long = "config")]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// Create, delete, start and inspect clusters.
    Cluster(cluster::Cluster),
    /// Create and delete infra-envs.
    InfraEnv(infra_env::InfraEnv),
    /// Download the discovery ISO of an infra-env.
    Iso(iso::Iso),
    /// Download or remove the credentials of a cluster.
    Credentials(credentials::Credentials),
    /// Inspect hosts that registered with the installer.
    Host(host::Host),
    /// Build and deploy the DPU vendor plugin.
    Dpu(dpu::Dpu),
    /// Control a server through its BMC.
    Bmc(power::Bmc),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(args.log_level);
    if let Err(e) = run(args).await {
        error!("{:?}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => DeploymentConfig::from_path(path)?,
        None => DeploymentConfig::default(),
    };
    let deployment = Deployment {
        installer_url: args
            .installer_url
            .or_else(|| config.installer_url.clone())
            .unwrap_or_else(|| DEFAULT_INSTALLER_URL.to_string()),
        config,
    };
    match args.command {
        Command::Cluster(cluster) => cluster.run(deployment).await,
        Command::InfraEnv(infra_env) => infra_env.run(deployment).await,
        Command::Iso(iso) => iso.run(deployment).await,
        Command::Credentials(credentials) => credentials.run(deployment).await,
        Command::Host(host) => host.run(deployment).await,
        Command::Dpu(dpu) => dpu.run().await,
        Command::Bmc(bmc) => bmc.run(deployment).await,
    }
}

/// Everything a subcommand needs to know about the deployment.
#[derive(Debug)]
pub(crate) struct Deployment {
    pub(crate) installer_url: String,
    pub(crate) config: DeploymentConfig,
}

impl Deployment {
    /// A driver for the installer at `installer_url`, timed as configured.
    pub(crate) fn driver(&self) -> Result<ClusterLifecycleDriver<AssistedClient>> {
        let client = AssistedClient::new(&self.installer_url).context(format!(
            "Unable to create installer client for '{}'",
            self.installer_url
        ))?;
        let mut driver = ClusterLifecycleDriver::with_settings(client, self.config.poll.settings());
        if let Some(dir) = &self.config.credentials_dir {
            driver = driver.credentials_dir(dir);
        }
        Ok(driver)
    }
}

/// Initialize the logger with the value passed by `--log-level` (or its default) when the
/// `RUST_LOG` environment variable is not present. If present, the `RUST_LOG` environment variable
/// overrides `--log-level`/`level`.
fn init_logger(level: LevelFilter) {
    match std::env::var(env_logger::DEFAULT_FILTER_ENV).ok() {
        Some(_) => {
            // RUST_LOG exists; env_logger will use it.
            Builder::from_default_env().init();
        }
        None => {
            // RUST_LOG does not exist; use default log level for the deployment crates only.
            let mut builder = Builder::new();
            for target in LOG_TARGETS {
                builder.filter(Some(target), level);
            }
            builder.init();
        }
    }
}
