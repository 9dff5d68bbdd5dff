/*!

This library provides the data model of the assisted installer service and the
[`InstallerClient`](clients::InstallerClient) capability used to talk to it.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use cluster::{ApiVip, ClusterInfo, ClusterRecord, ClusterState, InfraEnvRecord};
pub use credentials::CredentialPaths;
pub use error::{Error, Result};
pub use host::{HostInfo, HostRecord, Interface, Inventory, Route};
pub use ip_range::IpRange;

mod cluster;
pub mod clients;
pub mod constants;
mod credentials;
mod error;
mod host;
mod ip_range;

/// The free-form parameters sent along with a cluster or infra-env creation request, e.g.
/// `openshift_version`, `pull_secret` or `base_dns_domain`.
pub type ResourceConfig = serde_json::Map<String, serde_json::Value>;
