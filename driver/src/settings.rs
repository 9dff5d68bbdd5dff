use std::time::Duration;

/// Timing of the poll and retry loops of the
/// [`ClusterLifecycleDriver`](crate::ClusterLifecycleDriver).
///
/// The defaults match the installer's usual pace. Timeouts default to `None`, which means the
/// corresponding loop waits forever.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PollSettings {
    /// Pause between attempts to delete a cluster.
    pub delete_interval: Duration,
    /// Pause between two reads of a cluster's state.
    pub state_interval: Duration,
    /// How many times the discovery ISO download is attempted before giving up.
    pub iso_attempts: u32,
    /// Pause between two ISO download attempts.
    pub iso_retry_delay: Duration,
    pub delete_timeout: Option<Duration>,
    pub ready_timeout: Option<Duration>,
    pub install_timeout: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            delete_interval: Duration::from_secs(5),
            state_interval: Duration::from_secs(10),
            iso_attempts: 25,
            iso_retry_delay: Duration::from_secs(30),
            delete_timeout: None,
            ready_timeout: None,
            install_timeout: None,
        }
    }
}

impl PollSettings {
    /// Settings without any pause, for driving mock installers.
    pub fn immediate() -> Self {
        Self {
            delete_interval: Duration::ZERO,
            state_interval: Duration::ZERO,
            iso_retry_delay: Duration::ZERO,
            ..Default::default()
        }
    }
}
