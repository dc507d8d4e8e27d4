//! # Signal Scanner Types
//!
//! Shared data model for the Indodax market signal scanner.
//!
//! ## Design Philosophy
//!
//! - **Explicit absence**: indicator values that cannot be computed yet are
//!   `None`, never a zero placeholder
//! - **Exact volumes**: ticker prices and buy/sell volumes are parsed into
//!   `rust_decimal::Decimal` so classification thresholds compare exactly
//! - **Float series**: resampled candles and indicator frames use `f64`, the
//!   indicators need `sqrt` and exponential smoothing
//! - **Normalized identifiers**: `Pair` and `Timeframe` validate on construction
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{Pair, Timeframe};
//!
//! let pair: Pair = "BTC_IDR".parse().unwrap();
//! assert_eq!(pair.as_str(), "btc_idr");
//!
//! let tf: Timeframe = "1H".parse().unwrap();
//! assert_eq!(tf.as_secs(), 3600);
//! ```

pub mod errors;
pub mod indicator;
pub mod market;
pub mod signal;

pub use errors::TypesError;
pub use indicator::IndicatorFrame;
pub use market::{Pair, PricePoint, Summary, TickerSnapshot, Timeframe, Trade, TradeSide};
pub use signal::{
    AlertLogEntry, Classification, MarketSignal, SentSignalRecord, SignalEvent, SignalKind,
};

pub type Result<T> = std::result::Result<T, TypesError>;
