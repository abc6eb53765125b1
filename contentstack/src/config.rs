//! Stack configuration.

use contentstack_types::{CachePolicy, ConfigurationError, RequestContext};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Data centre serving the delivery API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    #[default]
    Us,
    Eu,
    AzureNa,
    AzureEu,
    GcpNa,
}

impl Region {
    pub const fn host(self) -> &'static str {
        match self {
            Region::Us => "cdn.contentstack.io",
            Region::Eu => "eu-cdn.contentstack.com",
            Region::AzureNa => "azure-na-cdn.contentstack.com",
            Region::AzureEu => "azure-eu-cdn.contentstack.com",
            Region::GcpNa => "gcp-na-cdn.contentstack.com",
        }
    }
}

/// Settings for one stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Stack API key.
    pub api_key: String,
    /// Delivery token, sent as the `access_token` header.
    pub delivery_token: String,
    /// Publishing environment every request is scoped to.
    pub environment: String,
    pub region: Region,
    /// Overrides the region host. May carry a scheme
    /// (`http://localhost:8080`); `https` is assumed otherwise.
    pub host: Option<String>,
    pub api_version: String,
    pub branch: Option<String>,
    /// Request timeout used by the default transport.
    pub timeout_secs: u64,
    pub cache_policy: CachePolicy,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            delivery_token: String::new(),
            environment: String::new(),
            region: Region::default(),
            host: None,
            api_version: "v3".to_string(),
            branch: None,
            timeout_secs: 30,
            cache_policy: CachePolicy::default(),
        }
    }
}

impl StackConfig {
    pub fn new(
        api_key: impl Into<String>,
        delivery_token: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            delivery_token: delivery_token.into(),
            environment: environment.into(),
            ..Self::default()
        }
    }

    /// Checks the settings every request depends on.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.api_key.is_empty() {
            return Err(ConfigurationError::MissingCredential("api_key"));
        }
        if self.delivery_token.is_empty() {
            return Err(ConfigurationError::MissingCredential("delivery_token"));
        }
        if self.environment.is_empty() {
            return Err(ConfigurationError::MissingCredential("environment"));
        }
        if self.api_version.is_empty() {
            return Err(ConfigurationError::InvalidArgument(
                "api_version must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Scheme, host and API version, without a trailing slash.
    pub fn base_url(&self) -> String {
        let host = self.host.as_deref().unwrap_or(self.region.host());
        let host = host.trim_end_matches('/');
        if host.contains("://") {
            format!("{host}/{}", self.api_version)
        } else {
            format!("https://{host}/{}", self.api_version)
        }
    }

    pub(crate) fn request_context(&self) -> RequestContext {
        let mut headers = BTreeMap::new();
        headers.insert("api_key".to_string(), self.api_key.clone());
        headers.insert("access_token".to_string(), self.delivery_token.clone());
        if let Some(branch) = &self.branch {
            headers.insert("branch".to_string(), branch.clone());
        }
        RequestContext {
            base_url: self.base_url(),
            headers,
            environment: Some(self.environment.clone()),
        }
    }
}
