use crate::dockerfile::extract_container_image;
use crate::error::{self, Result};
use crate::host::Host;
use crate::k8s::K8sClient;
use crate::vendor::VendorPlugin;
use crate::workdir::ScopedWorkingDir;
use async_trait::async_trait;
use log::{info, warn};
use snafu::ensure;
use std::path::{Path, PathBuf};

const REPO: &str = "https://github.com/intel/ipu-opi-plugins.git";
const DEFAULT_CLONE_DIR: &str = "/root/ipu-opi-plugins";
const DEFAULT_MANIFEST_TEMPLATE: &str = "manifests/dpu/dpu_vsp_ds.yaml.j2";
const DEFAULT_RENDERED_MANIFEST: &str = "/tmp/vsp-ds.yaml";
const PLUGIN_SUBDIR: &str = "ipu-plugin";
const BUILT_IMAGE: &str = "intel-ipuplugin:latest";
const BASE_IMAGE_REGISTRY: &str = "docker.io/library";

/// The vendor plugin of Intel IPUs, built from `ipu-opi-plugins`.
#[derive(Clone, Debug)]
pub struct IpuPlugin {
    repo: String,
    clone_dir: PathBuf,
    manifest_template: PathBuf,
    rendered_manifest: PathBuf,
}

impl Default for IpuPlugin {
    fn default() -> Self {
        Self {
            repo: REPO.to_string(),
            clone_dir: PathBuf::from(DEFAULT_CLONE_DIR),
            manifest_template: PathBuf::from(DEFAULT_MANIFEST_TEMPLATE),
            rendered_manifest: PathBuf::from(DEFAULT_RENDERED_MANIFEST),
        }
    }
}

impl IpuPlugin {
    pub fn repo_url<S: Into<String>>(mut self, repo: S) -> Self {
        self.repo = repo.into();
        self
    }

    /// Where the repository is cloned on the build host.
    pub fn clone_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.clone_dir = dir.into();
        self
    }

    pub fn manifest_template_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.manifest_template = path.into();
        self
    }

    /// Where the DaemonSet manifest is rendered to, locally and on the build host.
    pub fn rendered_manifest<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.rendered_manifest = path.into();
        self
    }

    pub fn rendered_manifest_path(&self) -> &Path {
        &self.rendered_manifest
    }

    /// The image reference the plugin is published under.
    pub fn image(registry: &str) -> String {
        format!("{}/ipu-plugin:dpu", registry)
    }

    fn plugin_dir(&self) -> PathBuf {
        self.clone_dir.join(PLUGIN_SUBDIR)
    }

    async fn build_image(&self, host: &dyn Host) -> Result<()> {
        let plugin_dir = self.plugin_dir();
        if host.is_localhost() {
            let _working_dir = ScopedWorkingDir::enter(&plugin_dir)?;
            let output = host
                .run_with_env(
                    &format!("make -C {} image", plugin_dir.display()),
                    &[("IMGTOOL", "podman")],
                )
                .await?;
            ensure!(
                output.success(),
                error::BuildSnafu {
                    host: host.hostname(),
                    stderr: output.stderr,
                }
            );
        } else {
            host.run_or_die(&format!(
                "cd {} && export IMGTOOL=podman && make image",
                plugin_dir.display()
            ))
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl VendorPlugin for IpuPlugin {
    fn repo(&self) -> &str {
        &self.repo
    }

    fn manifest_template(&self) -> &Path {
        &self.manifest_template
    }

    async fn build_and_start(
        &self,
        host: &dyn Host,
        client: &dyn K8sClient,
        registry: &str,
    ) -> Result<()> {
        info!("Building ipu-opi-plugin on '{}'", host.hostname());
        let clone_dir = self.clone_dir.display();
        host.run(&format!("rm -rf {}", clone_dir)).await?;
        host.run_or_die(&format!("git clone {} {}", self.repo, clone_dir))
            .await?;
        let dockerfile = host
            .run_or_die(&format!(
                "cat {}/images/Dockerfile",
                self.plugin_dir().display()
            ))
            .await?;
        let base_image = extract_container_image(&dockerfile.stdout)?;
        host.run_or_die(&format!("podman pull {}/{}", BASE_IMAGE_REGISTRY, base_image))
            .await?;

        self.build_image(host).await?;

        let image = Self::image(registry);
        host.run_or_die(&format!("podman tag {} {}", BUILT_IMAGE, image))
            .await?;

        self.render_daemonset(&image, &self.rendered_manifest)?;
        if host.is_localhost() {
            host.run_or_die(&format!("podman push {}", image)).await?;
        } else {
            host.copy_to(&self.rendered_manifest, &self.rendered_manifest)
                .await?;
        }

        if let Err(e) = client.delete_manifest(&self.rendered_manifest).await {
            warn!("Unable to delete the previous vendor plugin objects: {}", e);
        }
        client.create_manifest(&self.rendered_manifest).await?;
        info!("Started vendor plugin {}", image);
        Ok(())
    }
}
