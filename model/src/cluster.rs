use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A cluster as reported by the installer, either in the cluster listing or by the cluster detail
/// endpoint. Only the fields this crate interprets are modeled.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The status is kept as raw JSON so that a malformed (non-string) status can be told apart
    /// from a missing one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_vips: Option<Vec<ApiVip>>,
}

impl ClusterRecord {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_status<S: Into<String>>(mut self, status: S) -> Self {
        self.status = Some(serde_json::Value::String(status.into()));
        self
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ApiVip {
    pub ip: String,
}

/// An infra-env as reported by the installer listing.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct InfraEnvRecord {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// The identity and API endpoint of a cluster. Always fetched fresh, never cached.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInfo {
    pub id: String,
    pub api_vip: String,
}

/// The state of a cluster as reported by the installer. The set of states is owned by the
/// installer, so this is an opaque token compared by equality.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterState(String);

impl ClusterState {
    pub const READY: &'static str = "ready";
    pub const INSTALLING: &'static str = "installing";

    pub fn new<S: Into<String>>(state: S) -> Self {
        Self(state.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_ready(&self) -> bool {
        self.0 == Self::READY
    }

    pub fn is_installing(&self) -> bool {
        self.0 == Self::INSTALLING
    }
}

impl Display for ClusterState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl PartialEq<&str> for ClusterState {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
