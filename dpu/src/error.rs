use snafu::Snafu;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Unable to run `{}`: {}", command, source))]
    CommandSpawn {
        command: String,
        source: std::io::Error,
    },

    #[snafu(display(
        "Command `{}` on '{}' exited with code {}: {}",
        command,
        host,
        code,
        stderr
    ))]
    CommandFailed {
        host: String,
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[snafu(display("Unable to connect to '{}': {}", address, source))]
    Connect {
        address: String,
        source: openssh::Error,
    },

    #[snafu(display("Unable to run `{}` on '{}': {}", command, host, source))]
    RemoteCommand {
        host: String,
        command: String,
        source: openssh::Error,
    },

    #[snafu(display("Unable to copy '{}' to '{}': {}", from.display(), to, reason))]
    Copy {
        from: PathBuf,
        to: String,
        reason: String,
    },

    #[snafu(display("Unable to determine the hostname: {}", source))]
    Hostname { source: std::io::Error },

    #[snafu(display("Unable to enter working directory '{}': {}", path.display(), source))]
    WorkingDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Failed to find a container image in the Dockerfile"))]
    NoBaseImage,

    #[snafu(display("Failed to build vendor plugin images on '{}': {}", host, stderr))]
    Build { host: String, stderr: String },

    #[snafu(display("Unable to read '{}': {}", path.display(), source))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to write '{}': {}", path.display(), source))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to render template '{}': {}", path.display(), source))]
    Render {
        path: PathBuf,
        source: minijinja::Error,
    },

    #[snafu(display("Unable to read kubeconfig: {}", source))]
    Kubeconfig {
        source: kube::config::KubeconfigError,
    },

    #[snafu(display("Unable to infer the kubernetes configuration: {}", source))]
    InferConfig {
        source: kube::config::InferConfigError,
    },

    #[snafu(display("Unable to create kubernetes client: {}", source))]
    KubeClient { source: kube::Error },

    #[snafu(display("Unable to run API discovery: {}", source))]
    Discovery { source: kube::Error },

    #[snafu(display("Invalid manifest '{}': {}", path.display(), source))]
    ManifestParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[snafu(display("Manifest object in '{}' has no {}", path.display(), field))]
    ManifestField { path: PathBuf, field: String },

    #[snafu(display("Unknown resource type {}/{}", api_version, kind))]
    UnknownKind { api_version: String, kind: String },

    #[snafu(display("Unable to {} {} '{}': {}", method, kind, name, source))]
    KubeApiCall {
        method: String,
        kind: String,
        name: String,
        source: kube::Error,
    },
}
