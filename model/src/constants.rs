/// The path prefix of every assisted installer v2 endpoint.
pub const API_PREFIX: &str = "api/assisted-install/v2/";

/// The scheme assumed when the installer address is given as `host:port`.
pub const DEFAULT_SCHEME: &str = "http";

/// The route destination that marks a default route in a host inventory.
pub const DEFAULT_ROUTE_DESTINATION: &str = "0.0.0.0";

pub const KUBECONFIG_FILE_PREFIX: &str = "kubeconfig";
pub const KUBEADMIN_PASSWORD_FILE_PREFIX: &str = "kubeadmin-password";
pub const ISO_FILE_EXTENSION: &str = "iso";
