use crate::error::{self, Error, Result};
use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt, ResultExt};
use std::fmt::{Display, Formatter};
use std::net::IpAddr;
use std::str::FromStr;

/// An inclusive range of addresses, used to pick the address of a host on a particular network.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct IpRange {
    pub start: IpAddr,
    pub end: IpAddr,
}

impl IpRange {
    pub fn new(start: IpAddr, end: IpAddr) -> Self {
        Self { start, end }
    }

    /// Whether `address` lies within the range, bounds included. Addresses of a different family
    /// than the bounds are never contained.
    pub fn contains(&self, address: &IpAddr) -> bool {
        address.is_ipv4() == self.start.is_ipv4() && self.start <= *address && *address <= self.end
    }
}

impl FromStr for IpRange {
    type Err = Error;

    /// Parses `START-END`, e.g. `192.168.122.0-192.168.122.255`.
    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = s
            .split_once('-')
            .context(error::IpRangeFormatSnafu { range: s })?;
        let parse = |address: &str| -> Result<IpAddr> {
            Ok(address
                .trim()
                .parse()
                .context(error::IpRangeAddressSnafu {
                    range: s,
                    address: address.trim(),
                })?)
        };
        let range = Self::new(parse(start)?, parse(end)?);
        ensure!(
            range.start <= range.end,
            error::IpRangeOrderSnafu { range: s }
        );
        Ok(range)
    }
}

impl Display for IpRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
