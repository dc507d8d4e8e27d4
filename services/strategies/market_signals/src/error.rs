//! Error types for the market signal scanner

use indodax_adapter::AdapterError;
use rust_decimal::Decimal;
use thiserror::Error;
use types::TypesError;

/// Contract violations of the buy/sell classifier
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("Negative volume: buy={buy}, sell={sell}")]
    NegativeVolume { buy: Decimal, sell: Decimal },
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Market data unavailable: {0}")]
    Source(#[from] AdapterError),

    #[error("Invalid identifier: {0}")]
    Identifier(#[from] TypesError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audit log error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Snapshot error: {message}")]
    Snapshot { message: String },

    #[error("Unknown command: {0}")]
    InvalidCommand(String),
}

impl ScanError {
    pub fn configuration(message: impl Into<String>) -> Self {
        ScanError::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
