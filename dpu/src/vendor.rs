use crate::error::{self, Result};
use crate::host::Host;
use crate::ipu::IpuPlugin;
use crate::k8s::K8sClient;
use async_trait::async_trait;
use log::info;
use minijinja::{context, Environment};
use snafu::ResultExt;
use std::path::Path;

/// The build and deployment of a DPU vendor's offload plugin.
#[async_trait]
pub trait VendorPlugin: Send + Sync {
    /// The git repository the plugin is built from.
    fn repo(&self) -> &str;

    /// The Jinja template of the plugin's DaemonSet manifest.
    fn manifest_template(&self) -> &Path;

    /// Build the plugin image on `host`, publish it under `registry` and (re)create its
    /// DaemonSet through `client`.
    async fn build_and_start(
        &self,
        host: &dyn Host,
        client: &dyn K8sClient,
        registry: &str,
    ) -> Result<()>;

    /// Render the DaemonSet manifest for `image` into `destination`.
    fn render_daemonset(&self, image: &str, destination: &Path) -> Result<()> {
        let template_path = self.manifest_template();
        let template =
            std::fs::read_to_string(template_path).context(error::ReadSnafu {
                path: template_path,
            })?;
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        let rendered = env
            .render_str(
                &template,
                context! {
                    ipu_plugin_image => image,
                    plugin_image => image,
                },
            )
            .context(error::RenderSnafu {
                path: template_path,
            })?;
        info!("{}", rendered);
        std::fs::write(destination, rendered).context(error::WriteSnafu { path: destination })
    }
}

/// Pick the plugin for the DPU hardware of `host`. Only Intel IPUs are supported so far.
pub fn select_vendor_plugin(host: &dyn Host) -> Box<dyn VendorPlugin> {
    info!("Detected Intel IPU hardware on {}", host.hostname());
    Box::new(IpuPlugin::default())
}
