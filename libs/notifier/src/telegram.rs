//! Telegram Bot API notifier

use crate::config::TelegramConfig;
use crate::error::{NotifyError, Result};
use crate::Notifier;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Minimal view of a Bot API response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Escape the characters the Bot API reserves in HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Sends alerts through `sendMessage` and `sendPhoto`
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Self {
        if !config.is_configured() {
            warn!("Telegram token or chat id missing, notifications disabled");
        }
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_configured()
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        let token = self
            .config
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(NotifyError::NotConfigured("token"))?;
        let chat_id = self
            .config
            .chat_id
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or(NotifyError::NotConfigured("chat_id"))?;
        Ok((token, chat_id))
    }

    /// `sendMessage` with HTML parse mode; `text` is plain and gets escaped
    pub async fn post_message(&self, text: &str) -> Result<()> {
        let (token, chat_id) = self.credentials()?;
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "text": escape_html(text),
            "parse_mode": "HTML",
        });

        let response = self
            .client
            .post(self.config.method_url(token, "sendMessage"))
            .timeout(self.config.text_timeout())
            .json(&payload)
            .send()
            .await?;

        Self::check_response(response).await
    }

    /// `sendPhoto` as a multipart upload
    pub async fn post_photo(&self, path: &Path, caption: &str) -> Result<()> {
        let (token, chat_id) = self.credentials()?;
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot.png".to_string());

        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("photo", Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(self.config.method_url(token, "sendPhoto"))
            .timeout(self.config.media_timeout())
            .multipart(form)
            .send()
            .await?;

        Self::check_response(response).await
    }

    async fn check_response(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        let body = response.text().await?;
        let parsed: Option<ApiResponse> = serde_json::from_str(&body).ok();

        match parsed {
            Some(api) if status.is_success() && api.ok => Ok(()),
            Some(api) => Err(NotifyError::Rejected {
                status: status.as_u16(),
                description: api.description.unwrap_or_else(|| "no description".to_string()),
            }),
            None => Err(NotifyError::Rejected {
                status: status.as_u16(),
                description: body.chars().take(200).collect(),
            }),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, message: &str) -> bool {
        match self.post_message(message).await {
            Ok(()) => {
                debug!("Telegram message delivered ({} chars)", message.len());
                true
            }
            Err(NotifyError::NotConfigured(field)) => {
                debug!("Skipping Telegram message, {} not configured", field);
                false
            }
            Err(e) => {
                warn!("Telegram message failed (transient: {}): {}", e.is_transient(), e);
                false
            }
        }
    }

    async fn send_image(&self, path: &Path, caption: &str) -> bool {
        match self.post_photo(path, caption).await {
            Ok(()) => {
                info!("Telegram photo delivered: {:?}", path);
                true
            }
            Err(NotifyError::NotConfigured(field)) => {
                debug!("Skipping Telegram photo, {} not configured", field);
                false
            }
            Err(e) => {
                warn!("Telegram photo {:?} failed: {}", path, e);
                false
            }
        }
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
