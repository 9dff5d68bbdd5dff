/*!

`dpu-plugins` builds the offload plugin of a DPU vendor and deploys it to a cluster as a
DaemonSet.

A [`VendorPlugin`] knows where its source lives and how to turn it into a running DaemonSet. The
build runs through a [`Host`], either the local machine or a remote one reached over SSH, and the
manifest is applied through a [`K8sClient`].

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

mod dockerfile;
pub mod error;
mod host;
mod ipu;
mod k8s;
mod vendor;
mod workdir;

pub use dockerfile::extract_container_image;
pub use error::{Error, Result};
pub use host::{CommandOutput, Host, LocalHost, RemoteHost};
pub use ipu::IpuPlugin;
pub use k8s::{K8sClient, KubeClient};
pub use vendor::{select_vendor_plugin, VendorPlugin};
pub use workdir::ScopedWorkingDir;
