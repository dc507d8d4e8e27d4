//! # Notifier
//!
//! Delivery of alert text and snapshot images to the operator.
//!
//! Delivery is best effort: every call resolves to `true` when the message
//! was accepted and `false` otherwise. A notifier never panics and never
//! returns an error to the scanner; failures are logged here and the caller
//! simply does not record the signal as sent.

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

pub mod config;
pub mod error;
pub mod telegram;
pub mod test_utils;

pub use config::TelegramConfig;
pub use error::{NotifyError, Result};
pub use telegram::TelegramNotifier;
pub use test_utils::{CollectorNotifier, SentMessage};

/// Outbound channel for alerts
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    /// Deliver a text message; `true` when the remote end accepted it
    async fn send_text(&self, message: &str) -> bool;

    /// Deliver an image file with a caption; `true` when accepted
    async fn send_image(&self, path: &Path, caption: &str) -> bool;

    /// Name for logging
    fn name(&self) -> &str;
}
