use snafu::Snafu;

/// The error type for parsing and interpreting installer data.
#[derive(Debug, Snafu)]
pub struct Error(OpaqueError);
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum OpaqueError {
    #[snafu(display("Unable to parse the inventory of host '{}': {}", hostname, source))]
    InventoryParse {
        hostname: String,
        source: serde_json::Error,
    },

    #[snafu(display("Invalid address '{}' in IP range '{}': {}", address, range, source))]
    IpRangeAddress {
        range: String,
        address: String,
        source: std::net::AddrParseError,
    },

    #[snafu(display("IP range '{}' must have the form START-END", range))]
    IpRangeFormat { range: String },

    #[snafu(display("IP range '{}' starts after it ends", range))]
    IpRangeOrder { range: String },
}
