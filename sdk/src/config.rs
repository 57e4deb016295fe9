//! Provider configuration variables
//!
//! Same settings and environment fallbacks as the provider block.

use serde::{Deserialize, Serialize};

pub const DEFAULT_URL: &str = "twingate.com";
pub const DEFAULT_HTTP_TIMEOUT: u64 = 10;
pub const DEFAULT_HTTP_MAX_RETRY: u32 = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// The access key for API operations. Falls back to TWINGATE_API_TOKEN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Network ID, the subdomain of the Admin Console URL. Falls back to
    /// TWINGATE_NETWORK.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    /// Base API domain. Falls back to TWINGATE_URL, then "twingate.com".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Time limit in seconds for HTTP requests. Falls back to
    /// TWINGATE_HTTP_TIMEOUT, then 10.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_timeout: Option<u64>,

    /// Retry limit for transient HTTP failures. Falls back to
    /// TWINGATE_HTTP_MAX_RETRY, then 10.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_max_retry: Option<u32>,
}

impl Config {
    /// Resolve unset fields from the environment
    pub fn from_env() -> Self {
        Self::default().with_env_fallbacks()
    }

    pub fn with_env_fallbacks(mut self) -> Self {
        if self.api_token.is_none() {
            self.api_token = std::env::var("TWINGATE_API_TOKEN").ok();
        }
        if self.network.is_none() {
            self.network = std::env::var("TWINGATE_NETWORK").ok();
        }
        if self.url.is_none() {
            self.url = std::env::var("TWINGATE_URL").ok();
        }
        if self.http_timeout.is_none() {
            self.http_timeout = std::env::var("TWINGATE_HTTP_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.http_max_retry.is_none() {
            self.http_max_retry = std::env::var("TWINGATE_HTTP_MAX_RETRY")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        self
    }

    pub fn url_or_default(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_URL)
    }

    pub fn http_timeout_or_default(&self) -> u64 {
        self.http_timeout.unwrap_or(DEFAULT_HTTP_TIMEOUT)
    }

    pub fn http_max_retry_or_default(&self) -> u32 {
        self.http_max_retry.unwrap_or(DEFAULT_HTTP_MAX_RETRY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::default();

        assert_eq!(config.url_or_default(), "twingate.com");
        assert_eq!(config.http_timeout_or_default(), 10);
        assert_eq!(config.http_max_retry_or_default(), 10);
    }

    #[test]
    fn serializes_camel_case_and_skips_unset() {
        let config = Config {
            network: Some("autoco".to_string()),
            http_timeout: Some(30),
            ..Config::default()
        };

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"network": "autoco", "httpTimeout": 30})
        );
    }
}
