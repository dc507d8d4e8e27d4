//! Error types for identifier validation

use thiserror::Error;

/// Errors raised while constructing validated identifiers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    /// Pair symbol is empty or contains characters outside `[a-z0-9_]`
    #[error("Invalid pair '{symbol}': {reason}")]
    InvalidPair { symbol: String, reason: String },

    /// Timeframe label is not one of the supported buckets
    #[error("Unknown timeframe '{0}' - expected one of 5min, 15min, 30min, 1H, 4H, 1D")]
    UnknownTimeframe(String),
}
