use serde::{Deserialize, Serialize};

const DEFAULT_USER: &str = "root";
const DEFAULT_PASSWORD: &str = "calvin";

/// How to reach a BMC. The credentials default to Dell's factory settings.
#[derive(Clone, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BmcConfig {
    pub url: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_password")]
    pub password: String,
}

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

impl BmcConfig {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            user: default_user(),
            password: default_password(),
        }
    }
}

// Keep the password out of logs.
impl std::fmt::Debug for BmcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BmcConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=
