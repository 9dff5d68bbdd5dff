use crate::constants::DEFAULT_ROUTE_DESTINATION;
use crate::error::{self, Result};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::net::IpAddr;

/// A host as reported by the installer. The inventory is only present once the host has booted
/// the discovery ISO and reported its hardware.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    #[serde(default)]
    pub requested_hostname: String,

    #[serde(default)]
    pub status: String,

    /// The inventory is a JSON document serialized as a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<String>,
}

/// The status and inventory of a host that has reported its inventory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HostInfo {
    pub hostname: String,
    pub status: String,
    pub inventory: String,
}

impl HostInfo {
    /// Parse the inventory document of this host.
    pub fn parse_inventory(&self) -> Result<Inventory> {
        Ok(serde_json::from_str(&self.inventory).context(error::InventoryParseSnafu {
            hostname: &self.hostname,
        })?)
    }
}

/// The subset of a host inventory needed to find the address a host uses to reach the outside.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub routes: Vec<Route>,

    #[serde(default)]
    pub interfaces: Vec<Interface>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub destination: String,

    #[serde(default)]
    pub interface: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    #[serde(default)]
    pub name: String,

    /// Addresses in CIDR notation, e.g. `10.0.0.5/24`.
    #[serde(default)]
    pub ipv4_addresses: Vec<String>,
}

impl Inventory {
    /// The interface names of all default routes, in inventory order.
    pub fn default_route_interfaces(&self) -> impl Iterator<Item = &str> {
        self.routes
            .iter()
            .filter(|route| route.destination == DEFAULT_ROUTE_DESTINATION)
            .map(|route| route.interface.as_str())
    }

    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|nic| nic.name == name)
    }
}

impl Interface {
    /// The first IPv4 address of this interface with its prefix length removed. `None` if the
    /// interface has no address or the first one cannot be parsed.
    pub fn first_ipv4(&self) -> Option<IpAddr> {
        self.ipv4_addresses
            .first()
            .and_then(|cidr| cidr.split('/').next())
            .and_then(|address| address.parse().ok())
    }
}
