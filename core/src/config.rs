//! Client configuration and its lazy validation.
//!
//! # Design
//! `ClientConfig` is accepted as-is at construction; `validate` runs at the
//! top of every operation instead. When deserialized, a missing field or a
//! field of the wrong type becomes an empty string so the problem surfaces
//! as `ApiError::Config` at call time, the same way an empty value does.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ApiError, INVALID_API_KEY, INVALID_BASE_URL, INVALID_SERVER_ID};

pub const DEFAULT_BASE_URL: &str = "https://donatebot.io/api/v1";

/// Credentials and endpoint for one Discord server's Donate Bot account.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(rename = "serverID", default, deserialize_with = "lenient_string")]
    pub server_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub api_key: String,
    #[serde(default = "default_base_url", deserialize_with = "lenient_string")]
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(server_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            server_id: server_id.into(),
            api_key: api_key.into(),
            base_url: default_base_url(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Check that the configuration can be used to issue a request.
    ///
    /// Pure; performs no I/O. The server ID is checked before the API key.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.server_id.is_empty() || crate::client::is_dot_segment(&self.server_id) {
            return Err(ApiError::Config(INVALID_SERVER_ID.to_string()));
        }
        if self.api_key.is_empty() {
            return Err(ApiError::Config(INVALID_API_KEY.to_string()));
        }
        if self.base_url().is_empty() {
            return Err(ApiError::Config(INVALID_BASE_URL.to_string()));
        }
        Ok(())
    }

    pub(crate) fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server_id", &self.server_id)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        _ => String::new(),
    })
}
