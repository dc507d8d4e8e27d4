//! The market data seam consumed by the scanner

use crate::error::Result;
use crate::parse::TradeVolume;
use async_trait::async_trait;
use std::collections::BTreeMap;
use types::{Pair, PricePoint, Summary, TickerSnapshot, Timeframe};

/// Source of parsed market records
///
/// Implementations fetch and validate; callers treat any error as "no data
/// for this pair this tick".
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Every tradable pair, in sorted order
    async fn list_pairs(&self) -> Result<Vec<Pair>>;

    async fn get_summary(&self, pair: &Pair) -> Result<Summary>;

    /// Time-ascending candles, at most `limit` of the most recent
    async fn get_candles(&self, pair: &Pair, timeframe: Timeframe, limit: usize) -> Result<Vec<PricePoint>>;

    async fn get_all_tickers(&self) -> Result<BTreeMap<Pair, TickerSnapshot>>;

    /// Buy and sell amounts of the recent public trades
    async fn get_trade_volume(&self, pair: &Pair) -> Result<TradeVolume>;
}
