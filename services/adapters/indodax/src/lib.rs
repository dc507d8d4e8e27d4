//! # Indodax Adapter
//!
//! Public REST market data for the signal scanner: per-pair ticker
//! summaries, the all-tickers snapshot, recent trades, and candles resampled
//! from those trades.
//!
//! The scanner only depends on the [`MarketSource`] trait. [`IndodaxClient`]
//! is the production implementation; every request is bounded by the client
//! timeout and passes through a shared [`RateLimiter`].
//!
//! ## Endpoints
//!
//! | Method | Endpoint |
//! |--------|----------|
//! | `get_summary` | `GET /api/{pair}/ticker` |
//! | `get_all_tickers`, `list_pairs` | `GET /api/tickers` |
//! | `get_candles`, `get_trade_volume` | `GET /api/{pair}/trades` |

pub mod candles;
pub mod client;
pub mod config;
pub mod error;
pub mod parse;
pub mod rate_limit;
pub mod source;

pub use client::IndodaxClient;
pub use config::IndodaxConfig;
pub use error::{AdapterError, Result};
pub use parse::{ParsePolicy, TradeRecord, TradeVolume};
pub use rate_limit::RateLimiter;
pub use source::MarketSource;
