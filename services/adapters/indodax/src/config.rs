//! Configuration for the Indodax adapter

use crate::error::{AdapterError, Result};
use crate::parse::ParsePolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndodaxConfig {
    /// REST base URL, without the `/api` suffix
    pub base_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Outbound request budget; `0` disables limiting
    pub requests_per_minute: u32,

    /// Handling of missing ticker fields
    pub parse_policy: ParsePolicy,

    pub user_agent: String,
}

impl Default for IndodaxConfig {
    fn default() -> Self {
        Self {
            base_url: "https://indodax.com".to_string(),
            request_timeout_secs: 10,
            requests_per_minute: 180,
            parse_policy: ParsePolicy::DefaultMissingToZero,
            user_agent: concat!("indodax-signals/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl IndodaxConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(AdapterError::Configuration(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(AdapterError::Configuration(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Full URL of an `/api/...` endpoint
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url.trim_end_matches('/'), path)
    }
}
