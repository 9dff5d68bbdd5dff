use snafu::Snafu;
use std::path::PathBuf;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Unexpected number of clusters named '{}': {}", name, count))]
    AmbiguousCluster { name: String, count: usize },

    #[snafu(display("Requested status of cluster '{}' but couldn't find it", name))]
    ClusterNotFound { name: String },

    #[snafu(display("Unable to {}: {}", what, source))]
    Installer {
        what: String,
        source: installer_model::clients::Error,
    },

    #[snafu(display("{}", source))]
    Inventory { source: installer_model::Error },

    #[snafu(display("Missing API VIP in cluster info for cluster '{}'", name))]
    MissingApiVip { name: String },

    #[snafu(display("ID is missing in cluster info for cluster '{}'", name))]
    MissingClusterId { name: String },

    #[snafu(display("Status is missing for cluster '{}'", name))]
    MissingStatus { name: String },

    #[snafu(display(
        "Unable to rename '{}' to '{}': {}",
        from.display(),
        to.display(),
        source
    ))]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Timed out after {:?} trying to {} '{}'", after, operation, name))]
    Timeout {
        operation: String,
        name: String,
        after: Duration,
        source: tokio::time::error::Elapsed,
    },

    #[snafu(display("Unexpected status for cluster '{}': {}", name, status))]
    UnexpectedStatus { name: String, status: String },
}
