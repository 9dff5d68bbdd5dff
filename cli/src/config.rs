use anyhow::{Context, Result};
use bmc::BmcConfig;
use cluster_driver::PollSettings;
use installer_model::ResourceConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The YAML deployment file passed with `--config`.
///
/// ```yaml
/// installerUrl: 192.168.122.1:8090
/// credentialsDir: /root
/// cluster:
///   openshift_version: "4.14"
///   base_dns_domain: redhat.com
/// infraEnv:
///   cluster: demo
///   image_type: full-iso
/// poll:
///   stateInterval: 10
///   readyTimeout: 3600
/// bmc:
///   url: https://10.1.0.2
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct DeploymentConfig {
    pub(crate) installer_url: Option<String>,
    pub(crate) credentials_dir: Option<PathBuf>,
    /// Parameters of created clusters.
    pub(crate) cluster: ResourceConfig,
    /// Parameters of created infra-envs.
    pub(crate) infra_env: ResourceConfig,
    pub(crate) poll: PollConfig,
    pub(crate) bmc: Option<BmcConfig>,
}

impl DeploymentConfig {
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .context(format!("Unable to open config file '{}'", path.display()))?;
        serde_yaml::from_reader(file)
            .context(format!("Unable to parse config file '{}'", path.display()))
    }
}

/// Poll timing in seconds. Absent values keep the driver's defaults, absent timeouts wait forever.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct PollConfig {
    pub(crate) delete_interval: Option<u64>,
    pub(crate) state_interval: Option<u64>,
    pub(crate) iso_attempts: Option<u32>,
    pub(crate) iso_retry_delay: Option<u64>,
    pub(crate) delete_timeout: Option<u64>,
    pub(crate) ready_timeout: Option<u64>,
    pub(crate) install_timeout: Option<u64>,
}

impl PollConfig {
    pub(crate) fn settings(&self) -> PollSettings {
        let defaults = PollSettings::default();
        let seconds = |value: Option<u64>| value.map(Duration::from_secs);
        PollSettings {
            delete_interval: seconds(self.delete_interval).unwrap_or(defaults.delete_interval),
            state_interval: seconds(self.state_interval).unwrap_or(defaults.state_interval),
            iso_attempts: self.iso_attempts.unwrap_or(defaults.iso_attempts),
            iso_retry_delay: seconds(self.iso_retry_delay).unwrap_or(defaults.iso_retry_delay),
            delete_timeout: seconds(self.delete_timeout),
            ready_timeout: seconds(self.ready_timeout),
            install_timeout: seconds(self.install_timeout),
        }
    }
}
