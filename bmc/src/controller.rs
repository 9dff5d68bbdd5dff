use crate::config::BmcConfig;
use crate::error::{self, Result};
use crate::redfish::{Model, RedfishApi, RedfishClient, ResetType};
use log::{error, info, warn};
use snafu::ensure;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Retry counts and pauses of the BMC operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BootSettings {
    /// Attempts at booting an ISO.
    pub retries: u32,
    pub retry_delay: Duration,
    /// Pause after the restart that boots the ISO.
    pub boot_settle: Duration,
    /// Requests sent to restart the Redfish service.
    pub reset_attempts: u32,
    pub reset_interval: Duration,
    pub ping_interval: Duration,
    /// How long the Redfish service may take to come back after a restart.
    pub ping_timeout: Duration,
    pub power_off_settle: Duration,
    pub power_on_settle: Duration,
}

impl Default for BootSettings {
    fn default() -> Self {
        Self {
            retries: 10,
            retry_delay: Duration::from_secs(60),
            boot_settle: Duration::from_secs(10),
            reset_attempts: 10,
            reset_interval: Duration::from_secs(5),
            ping_interval: Duration::from_secs(1),
            ping_timeout: Duration::from_secs(10 * 60),
            power_off_settle: Duration::from_secs(10),
            power_on_settle: Duration::from_secs(5),
        }
    }
}

impl BootSettings {
    /// No pauses at all, the retry counts stay the same.
    pub fn immediate() -> Self {
        Self {
            retry_delay: Duration::ZERO,
            boot_settle: Duration::ZERO,
            reset_interval: Duration::ZERO,
            ping_interval: Duration::ZERO,
            ping_timeout: Duration::ZERO,
            power_off_settle: Duration::ZERO,
            power_on_settle: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// A server's baseboard management controller.
///
/// Redfish is used to boot ISO images with virtual media, so it has to be enabled on the BMC.
/// On Dell servers it depends on a healthy iDRAC. When booting keeps failing, rebooting the iDRAC
/// or updating its firmware usually helps.
#[derive(Debug)]
pub struct Bmc<R> {
    url: String,
    redfish: R,
    settings: BootSettings,
}

impl Bmc<RedfishClient> {
    pub fn from_config(config: &BmcConfig) -> Result<Self> {
        ensure!(!config.url.is_empty(), error::NotDefinedSnafu);
        info!("BMC at '{}' as user '{}'", config.url, config.user);
        Ok(Self::new(&config.url, RedfishClient::new(config)?))
    }
}

impl<R> Bmc<R>
where
    R: RedfishApi,
{
    pub fn new<S: Into<String>>(url: S, redfish: R) -> Self {
        Self {
            url: url.into(),
            redfish,
            settings: BootSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: BootSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn redfish(&self) -> &R {
        &self.redfish
    }

    /// Boot the server from the ISO at `iso_url`, which must be reachable by the BMC.
    ///
    /// Every fifth failed attempt restarts the Redfish service before trying again. The error of
    /// the last attempt is returned once all attempts failed.
    pub async fn boot_iso(&self, iso_url: &str) -> Result<()> {
        ensure!(
            iso_url.contains(':'),
            error::InvalidIsoUrlSnafu { url: iso_url }
        );
        let retries = self.settings.retries.max(1);
        for attempt in 0..retries {
            let e = match self.try_boot_iso(iso_url, attempt).await {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };
            warn!(
                "Booting '{}' from '{}' failed on attempt {}: {}",
                self.url, iso_url, attempt, e
            );
            if attempt % 5 == 4 {
                info!("Restarting redfish");
                self.restart_redfish().await?;
            }
            if attempt == retries - 1 {
                return Err(e);
            }
            sleep(self.settings.retry_delay).await;
        }
        Ok(())
    }

    async fn try_boot_iso(&self, iso_url: &str, attempt: u32) -> Result<()> {
        info!(
            "Trying to boot {} using {}, attempt {}",
            self.url, iso_url, attempt
        );
        if let Err(e) = self.redfish.eject_iso().await {
            info!("Eject failed, but continuing: {}", e);
        }
        info!("Inserting iso {}", iso_url);
        self.redfish.insert_iso(iso_url).await?;
        self.redfish.set_iso_once().await?;
        info!("Setting to boot from iso");
        self.redfish.reset_system(ResetType::ForceRestart).await?;
        sleep(self.settings.boot_settle).await;
        info!("Finished sending boot to {}", self.url);
        Ok(())
    }

    /// Restart the Redfish service and wait for it to answer again. Only Dell BMCs need this,
    /// others are left alone.
    pub async fn restart_redfish(&self) -> Result<()> {
        if self.redfish.model().await? != Model::Dell {
            return Ok(());
        }
        for _ in 0..self.settings.reset_attempts {
            match self.redfish.reset_manager().await {
                Ok(()) => {
                    info!("Command to reset redfish sent successfully");
                    break;
                }
                Err(e) => {
                    error!("Failed to reset redfish at '{}': {}", self.url, e);
                    sleep(self.settings.reset_interval).await;
                }
            }
        }

        let deadline = Instant::now() + self.settings.ping_timeout;
        loop {
            if self.redfish.ping().await {
                info!("Redfish reset completed");
                return Ok(());
            }
            ensure!(
                Instant::now() < deadline,
                error::RedfishDownSnafu {
                    url: &self.url,
                    after: self.settings.ping_timeout,
                }
            );
            info!("Waiting for redfish reset to complete");
            sleep(self.settings.ping_interval).await;
        }
    }

    pub async fn stop(&self) -> Result<()> {
        self.redfish.reset_system(ResetType::ForceOff).await
    }

    pub async fn start(&self) -> Result<()> {
        self.redfish.reset_system(ResetType::On).await
    }

    /// Power the server off and on again.
    pub async fn cold_boot(&self) -> Result<()> {
        self.stop().await?;
        sleep(self.settings.power_off_settle).await;
        self.start().await?;
        sleep(self.settings.power_on_settle).await;
        Ok(())
    }
}
