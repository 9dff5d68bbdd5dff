use crate::Deployment;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// Download the discovery ISO of an infra-env, retrying while the installer prepares it.
#[derive(Debug, Parser)]
pub(crate) struct Iso {
    infra_env: String,

    /// Directory the ISO is written to.
    #[clap(long = "dir", default_value = ".")]
    dir: PathBuf,
}

impl Iso {
    pub(crate) async fn run(self, deployment: Deployment) -> Result<()> {
        let path = deployment
            .driver()?
            .download_iso_with_retry(&self.infra_env, &self.dir)
            .await
            .context(format!(
                "Unable to download the ISO of infra-env '{}'",
                self.infra_env
            ))?
            .context(format!(
                "The ISO of infra-env '{}' could not be downloaded",
                self.infra_env
            ))?;
        println!("{}", path.display());
        Ok(())
    }
}
