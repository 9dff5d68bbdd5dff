use snafu::Snafu;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("BMC not defined"))]
    NotDefined,

    #[snafu(display("ISO location '{}' is not a URL", url))]
    InvalidIsoUrl { url: String },

    #[snafu(display("Unable to build the Redfish client: {}", source))]
    Build { source: reqwest::Error },

    #[snafu(display("Unable to {}: {}", what, source))]
    Request {
        what: String,
        source: reqwest::Error,
    },

    #[snafu(display("Unable to {}: status {}: {}", what, status, body))]
    Status {
        what: String,
        status: u16,
        body: String,
    },

    #[snafu(display("Unable to decode the answer to {}: {}", what, source))]
    Decode {
        what: String,
        source: reqwest::Error,
    },

    #[snafu(display("No {} found", what))]
    MissingMember { what: String },

    #[snafu(display("Redfish at '{}' didn't come up after {:?}", url, after))]
    RedfishDown { url: String, after: Duration },
}
