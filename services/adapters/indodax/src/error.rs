//! Error types for the Indodax adapter

use thiserror::Error;
use types::TypesError;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Main error type for adapter operations
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Transport failure, including request timeouts
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status from the exchange
    #[error("Unexpected status {status} from {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Exchange answered 429
    #[error("Rate limit exceeded for {url}")]
    RateLimited {
        /// Requested URL
        url: String,
    },

    /// JSON parsing error from exchange response
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Required field missing from exchange payload
    #[error("Missing required field: {field}")]
    MissingField {
        /// The field that was missing
        field: String,
    },

    /// Invalid numeric value in exchange data
    #[error("Invalid numeric value for {field}: {value}")]
    InvalidNumeric {
        /// Field being parsed
        field: String,
        /// The value that couldn't be parsed
        value: String,
    },

    /// Negative price or volume in exchange data
    #[error("Negative value for {field}: {value}")]
    NegativeValue {
        /// Field being parsed
        field: String,
        /// Offending value
        value: String,
    },

    /// The exchange does not know the requested pair
    #[error("Unknown pair: {0}")]
    UnknownPair(String),

    /// Pair key from the exchange failed validation
    #[error(transparent)]
    InvalidPair(#[from] TypesError),

    /// Configuration error in adapter settings
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AdapterError {
    /// Check if this error may clear up on a later poll
    pub fn is_recoverable(&self) -> bool {
        match self {
            AdapterError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            AdapterError::Status { status, .. } => *status >= 500,
            AdapterError::RateLimited { .. } => true,
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AdapterError::Http(e) if e.is_timeout())
    }

    /// Check if this error indicates a permanent failure
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            AdapterError::UnknownPair(_) | AdapterError::Configuration(_) | AdapterError::InvalidPair(_)
        )
    }
}
