use crate::Notifier;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Text(String),
    Image { path: PathBuf, caption: String },
}

/// A notifier that just collects messages for testing
#[derive(Debug, Default)]
pub struct CollectorNotifier {
    messages: Arc<Mutex<Vec<SentMessage>>>,
    fail_on_send: AtomicBool,
    fail_all: AtomicBool,
    attempts: AtomicU64,
}

impl CollectorNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all delivered messages
    pub fn received_messages(&self) -> Vec<SentMessage> {
        self.messages.lock().clone()
    }

    /// Delivered text bodies only
    pub fn texts(&self) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter_map(|m| match m {
                SentMessage::Text(text) => Some(text.clone()),
                SentMessage::Image { .. } => None,
            })
            .collect()
    }

    pub fn message_count(&self) -> usize {
        self.messages.lock().len()
    }

    /// Send attempts, including failed ones
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn clear_messages(&self) {
        self.messages.lock().clear();
    }

    /// Configure to fail on next send
    pub fn fail_next_send(&self) {
        self.fail_on_send.store(true, Ordering::Relaxed);
    }

    /// Fail every send until cleared
    pub fn set_failing(&self, failing: bool) {
        self.fail_all.store(failing, Ordering::Relaxed);
    }

    fn deliver(&self, message: SentMessage) -> bool {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        if self.fail_all.load(Ordering::Relaxed) || self.fail_on_send.swap(false, Ordering::Relaxed) {
            return false;
        }
        self.messages.lock().push(message);
        true
    }
}

#[async_trait]
impl Notifier for CollectorNotifier {
    async fn send_text(&self, message: &str) -> bool {
        self.deliver(SentMessage::Text(message.to_string()))
    }

    async fn send_image(&self, path: &Path, caption: &str) -> bool {
        self.deliver(SentMessage::Image {
            path: path.to_path_buf(),
            caption: caption.to_string(),
        })
    }

    fn name(&self) -> &str {
        "collector"
    }
}
