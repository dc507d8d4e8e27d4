//! # Market Signals
//!
//! Technical-indicator scanner for Indodax pairs. Candles are resampled from
//! public trades, indicators computed per frame, and RSI, MACD and volume
//! events on the latest frame are pushed to Telegram once per distinct
//! signal text.
//!
//! ## Components
//!
//! - [`Scanner`]: batch auto-scan, interactive single-pair scan, market overview
//! - [`SignalLedger`]: dedup of sent alerts, shared by every caller
//! - [`CsvAuditLog`] / [`SignalLog`]: append-only alert logs
//! - [`SignalService`]: scheduled auto-scan and snapshot jobs
//! - [`console`]: interactive command loop

pub mod logging;

pub mod audit;
pub mod config;
pub mod console;
pub mod error;
pub mod indicators;
pub mod ledger;
pub mod overview;
pub mod scanner;
pub mod scheduler;
pub mod service;
pub mod signals;
pub mod snapshot;
pub mod test_utils;

pub use audit::{AuditSink, CsvAuditLog, SignalLog};
pub use config::SignalsConfig;
pub use error::{ClassifyError, Result, ScanError};
pub use indicators::compute_indicators;
pub use ledger::{PendingDispatch, SignalLedger};
pub use overview::{format_price, MarketSignalBoard};
pub use scanner::{BatchReport, InteractiveOutcome, MarketOverview, Scanner, ScannerParts};
pub use service::SignalService;
pub use signals::{classify, classify_with_ratio, detect_events, position_suggestion};
pub use snapshot::{MarketDigest, Snapshot, SnapshotProvider};
