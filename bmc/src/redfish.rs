use crate::config::BmcConfig;
use crate::error::{self, Result};
use async_trait::async_trait;
use log::{debug, trace};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use snafu::{OptionExt, ResultExt};
use std::fmt;
use std::time::Duration;

const SERVICE_ROOT: &str = "/redfish/v1";
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// The `ResetType` values of a computer system reset.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResetType {
    ForceRestart,
    ForceOff,
    On,
}

impl fmt::Display for ResetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            ResetType::ForceRestart => "ForceRestart",
            ResetType::ForceOff => "ForceOff",
            ResetType::On => "On",
        };
        f.write_str(value)
    }
}

/// The server vendor, as far as it changes how the BMC is handled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Model {
    Dell,
    Other,
}

/// The Redfish operations a [`crate::Bmc`] is built on.
#[async_trait]
pub trait RedfishApi: Send + Sync {
    async fn eject_iso(&self) -> Result<()>;

    /// Insert the ISO at `iso_url` as virtual CD.
    async fn insert_iso(&self, iso_url: &str) -> Result<()>;

    /// Boot from the virtual CD on the next boot only.
    async fn set_iso_once(&self) -> Result<()>;

    async fn reset_system(&self, reset: ResetType) -> Result<()>;

    /// Ask the BMC itself to restart gracefully.
    async fn reset_manager(&self) -> Result<()>;

    /// Whether the Redfish service answers.
    async fn ping(&self) -> bool;

    async fn model(&self) -> Result<Model>;
}

#[derive(Debug, Deserialize)]
struct Collection {
    #[serde(rename = "Members", default)]
    members: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "@odata.id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct VirtualMedia {
    #[serde(rename = "@odata.id")]
    id: String,
    #[serde(rename = "MediaTypes", default)]
    media_types: Vec<String>,
}

/// A [`RedfishApi`] over HTTPS. BMCs ship self-signed certificates, so certificates are not
/// verified.
#[derive(Clone)]
pub struct RedfishClient {
    url: String,
    user: String,
    password: String,
    http: reqwest::Client,
}

impl fmt::Debug for RedfishClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedfishClient")
            .field("url", &self.url)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl RedfishClient {
    pub fn new(config: &BmcConfig) -> Result<Self> {
        let url = if config.url.contains("://") {
            config.url.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", config.url.trim_end_matches('/'))
        };
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .context(error::BuildSnafu)?;
        Ok(Self {
            url,
            user: config.user.clone(),
            password: config.password.clone(),
            http,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// `path` is absolute on the BMC, as in `@odata.id` links.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        what: &str,
    ) -> Result<Response> {
        let url = format!("{}{}", self.url, path);
        trace!("{} {}", method, url);
        let mut request = self
            .http
            .request(method, &url)
            .basic_auth(&self.user, Some(&self.password));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.context(error::RequestSnafu { what })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        error::StatusSnafu {
            what,
            status: status.as_u16(),
            body,
        }
        .fail()
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        self.request(Method::GET, path, None, what)
            .await?
            .json()
            .await
            .context(error::DecodeSnafu { what })
    }

    async fn first_member(&self, collection: &str, what: &str) -> Result<String> {
        let collection: Collection = self
            .get(&format!("{}/{}", SERVICE_ROOT, collection), what)
            .await?;
        collection
            .members
            .into_iter()
            .next()
            .map(|link| link.id)
            .context(error::MissingMemberSnafu { what })
    }

    async fn system(&self) -> Result<String> {
        self.first_member("Systems", "computer system").await
    }

    async fn manager(&self) -> Result<String> {
        self.first_member("Managers", "manager").await
    }

    /// The virtual media slot of the manager that takes CDs.
    async fn virtual_cd(&self) -> Result<String> {
        let manager = self.manager().await?;
        let collection: Collection = self
            .get(&format!("{}/VirtualMedia", manager), "list virtual media")
            .await?;
        let mut first = None;
        for link in collection.members {
            let media: VirtualMedia = self.get(&link.id, "get virtual media").await?;
            if media
                .media_types
                .iter()
                .any(|kind| kind == "CD" || kind == "DVD")
            {
                return Ok(media.id);
            }
            first.get_or_insert(media.id);
        }
        first.context(error::MissingMemberSnafu {
            what: "virtual media",
        })
    }
}

/// Dell's managers are named after the iDRAC.
fn model_of(manager: &str) -> Model {
    let id = manager.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    if id.starts_with("iDRAC") {
        Model::Dell
    } else {
        Model::Other
    }
}

#[async_trait]
impl RedfishApi for RedfishClient {
    async fn eject_iso(&self) -> Result<()> {
        let media = self.virtual_cd().await?;
        self.request(
            Method::POST,
            &format!("{}/Actions/VirtualMedia.EjectMedia", media),
            Some(json!({})),
            "eject virtual media",
        )
        .await?;
        Ok(())
    }

    async fn insert_iso(&self, iso_url: &str) -> Result<()> {
        let media = self.virtual_cd().await?;
        self.request(
            Method::POST,
            &format!("{}/Actions/VirtualMedia.InsertMedia", media),
            Some(json!({
                "Image": iso_url,
                "Inserted": true,
                "WriteProtected": true,
            })),
            "insert virtual media",
        )
        .await?;
        Ok(())
    }

    async fn set_iso_once(&self) -> Result<()> {
        let system = self.system().await?;
        self.request(
            Method::PATCH,
            &system,
            Some(json!({
                "Boot": {
                    "BootSourceOverrideEnabled": "Once",
                    "BootSourceOverrideTarget": "Cd",
                }
            })),
            "set a one-time boot from virtual media",
        )
        .await?;
        Ok(())
    }

    async fn reset_system(&self, reset: ResetType) -> Result<()> {
        let system = self.system().await?;
        self.request(
            Method::POST,
            &format!("{}/Actions/ComputerSystem.Reset", system),
            Some(json!({ "ResetType": reset.to_string() })),
            &format!("reset the computer system ({})", reset),
        )
        .await?;
        Ok(())
    }

    async fn reset_manager(&self) -> Result<()> {
        let manager = self.manager().await?;
        self.request(
            Method::POST,
            &format!("{}/Actions/Manager.Reset", manager),
            Some(json!({ "ResetType": "GracefulRestart" })),
            "reset the manager",
        )
        .await?;
        Ok(())
    }

    async fn ping(&self) -> bool {
        let response = self
            .http
            .get(&self.url)
            .basic_auth(&self.user, Some(&self.password))
            .timeout(PING_TIMEOUT)
            .send()
            .await;
        match response {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                debug!("Redfish at '{}' does not answer: {}", self.url, e);
                false
            }
        }
    }

    async fn model(&self) -> Result<Model> {
        Ok(model_of(&self.manager().await?))
    }
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=
