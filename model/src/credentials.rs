use crate::constants::{KUBEADMIN_PASSWORD_FILE_PREFIX, KUBECONFIG_FILE_PREFIX};
use std::path::{Path, PathBuf};

/// The local files holding the credentials of a cluster.
///
/// The installer always names a downloaded kubeconfig `kubeconfig.<cluster>`, so when the caller
/// asks for a different path, `downloaded_kubeconfig` and `kubeconfig` differ and the downloaded
/// file has to be renamed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CredentialPaths {
    /// The directory the installer downloads into.
    pub directory: PathBuf,
    /// Where the caller wants the kubeconfig.
    pub kubeconfig: PathBuf,
    /// Where the installer puts the kubeconfig.
    pub downloaded_kubeconfig: PathBuf,
    pub kubeadmin_password: PathBuf,
}

impl CredentialPaths {
    /// Resolve the credential paths of `cluster_name`. An explicit kubeconfig path also decides
    /// the download directory; otherwise `default_dir` is used.
    pub fn resolve(
        cluster_name: &str,
        explicit_kubeconfig: Option<&Path>,
        default_dir: &Path,
    ) -> Self {
        let directory = match explicit_kubeconfig {
            Some(path) => path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
            None => default_dir.to_path_buf(),
        };
        let downloaded_kubeconfig = directory.join(kubeconfig_file_name(cluster_name));
        let kubeconfig = explicit_kubeconfig
            .map(Path::to_path_buf)
            .unwrap_or_else(|| downloaded_kubeconfig.clone());
        let kubeadmin_password = directory.join(kubeadmin_password_file_name(cluster_name));
        Self {
            directory,
            kubeconfig,
            downloaded_kubeconfig,
            kubeadmin_password,
        }
    }

    /// Whether the downloaded kubeconfig has to be moved to the requested path.
    pub fn needs_rename(&self) -> bool {
        self.downloaded_kubeconfig != self.kubeconfig
    }
}

pub fn kubeconfig_file_name(cluster_name: &str) -> String {
    format!("{}.{}", KUBECONFIG_FILE_PREFIX, cluster_name)
}

pub fn kubeadmin_password_file_name(cluster_name: &str) -> String {
    format!("{}.{}", KUBEADMIN_PASSWORD_FILE_PREFIX, cluster_name)
}
