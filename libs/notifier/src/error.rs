use thiserror::Error;

/// Failures inside a notifier; never surfaced past the `Notifier` trait
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notifier not configured: {0}")]
    NotConfigured(&'static str),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote rejected message: status {status}, description: {description}")]
    Rejected { status: u16, description: String },

    #[error("Failed to read attachment: {0}")]
    Io(#[from] std::io::Error),
}

impl NotifyError {
    /// Timeouts and 5xx responses may succeed on a later tick
    pub fn is_transient(&self) -> bool {
        match self {
            NotifyError::Http(e) => e.is_timeout() || e.is_connect(),
            NotifyError::Rejected { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, NotifyError>;
