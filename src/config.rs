use crate::{Result, TemplateToolError};
use std::fmt;

pub const URL_ENV: &str = "ZABBIX_URL";
pub const USERNAME_ENV: &str = "ZABBIX_USERNAME";
pub const PASSWORD_ENV: &str = "ZABBIX_PASSWORD";

const API_SCRIPT: &str = "api_jsonrpc.php";

/// Connection settings for one API session.
#[derive(Clone)]
pub struct ZabbixConfig {
    pub url: String,
    pub username: String,
    pub password: String,
}

impl ZabbixConfig {
    /// Load settings from `ZABBIX_URL`, `ZABBIX_USERNAME` and `ZABBIX_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// Unset and empty variables are both treated as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| -> Result<String> {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(TemplateToolError::MissingEnv(key))
        };

        Ok(Self {
            url: require(URL_ENV)?,
            username: require(USERNAME_ENV)?,
            password: require(PASSWORD_ENV)?,
        })
    }

    /// JSON-RPC endpoint for the configured frontend URL.
    pub fn api_endpoint(&self) -> String {
        if self.url.ends_with(API_SCRIPT) {
            self.url.clone()
        } else {
            format!("{}/{}", self.url.trim_end_matches('/'), API_SCRIPT)
        }
    }
}

impl fmt::Debug for ZabbixConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZabbixConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
