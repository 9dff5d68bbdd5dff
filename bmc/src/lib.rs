/*!

Out-of-band control of bare-metal servers through their BMC's Redfish API: boot a server from an
ISO served over HTTP, power it off and on, and restart a wedged Redfish service.

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

mod config;
mod controller;
mod error;
mod redfish;

pub use config::BmcConfig;
pub use controller::{Bmc, BootSettings};
pub use error::{Error, Result};
pub use redfish::{Model, RedfishApi, RedfishClient, ResetType};
