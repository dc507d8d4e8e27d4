//! Telegram notifier configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bot credentials and delivery timeouts
///
/// `token` and `chat_id` are the only secrets in the system. When either is
/// absent the notifier is disabled and every send returns `false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: String,
    pub text_timeout_secs: u64,
    pub media_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            chat_id: None,
            api_base: "https://api.telegram.org".to_string(),
            text_timeout_secs: 10,
            media_timeout_secs: 20,
        }
    }
}

impl TelegramConfig {
    pub fn is_configured(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.token) && present(&self.chat_id)
    }

    pub fn text_timeout(&self) -> Duration {
        Duration::from_secs(self.text_timeout_secs)
    }

    pub fn media_timeout(&self) -> Duration {
        Duration::from_secs(self.media_timeout_secs)
    }

    /// Endpoint URL for a Bot API method
    pub(crate) fn method_url(&self, token: &str, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base.trim_end_matches('/'), token, method)
    }
}
