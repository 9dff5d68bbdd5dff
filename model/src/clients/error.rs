use snafu::Snafu;
use std::path::PathBuf;

/// The `Result` type returned by [`InstallerClient`](super::InstallerClient) implementations.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type returned by [`InstallerClient`](super::InstallerClient) implementations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Unable to build the HTTP client: {}", source))]
    Build { source: reqwest::Error },

    #[snafu(display("Unable to create '{}': {}", path.display(), source))]
    CreateFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to decode the response to {}: {}", what, source))]
    Decode { what: String, source: reqwest::Error },

    #[snafu(display("Invalid installer URL '{}': {}", url, source))]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[snafu(display("The field '{}' is missing from {}", field, what))]
    MissingField { what: String, field: String },

    #[snafu(display("No {} named '{}' exists", kind, name))]
    NotFound { kind: String, name: String },

    #[snafu(display("Unable to {}: {}", what, source))]
    Request { what: String, source: reqwest::Error },

    #[snafu(display("Unable to {}: the installer answered {}: {}", what, status, body))]
    Status {
        what: String,
        status: u16,
        body: String,
    },

    #[snafu(display("Unable to write '{}': {}", path.display(), source))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Whether the object the request referred to does not exist, either because the name was
    /// not in the listing or because the installer answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::Status { status: 404, .. })
    }
}
