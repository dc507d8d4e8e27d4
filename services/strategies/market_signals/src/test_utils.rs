//! In-memory market source and canned candle series for tests

use async_trait::async_trait;
use chrono::DateTime;
use indodax_adapter::{AdapterError, MarketSource, TradeVolume};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use types::{Pair, PricePoint, Summary, TickerSnapshot, Timeframe};

/// Hour-aligned start of every canned series
pub const SERIES_START: i64 = 1_699_999_200;

/// Market source backed by fixed data
///
/// Pairs marked failing answer every request with a 502.
#[derive(Debug, Default)]
pub struct StaticMarketSource {
    pairs: RwLock<BTreeSet<Pair>>,
    candles: RwLock<HashMap<Pair, Vec<PricePoint>>>,
    summaries: RwLock<HashMap<Pair, Summary>>,
    volumes: RwLock<HashMap<Pair, TradeVolume>>,
    tickers: RwLock<BTreeMap<Pair, TickerSnapshot>>,
    failing: RwLock<HashSet<Pair>>,
    candle_requests: Mutex<Vec<Pair>>,
}

impl StaticMarketSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_candles(&self, pair: &Pair, points: Vec<PricePoint>) {
        self.pairs.write().insert(pair.clone());
        self.candles.write().insert(pair.clone(), points);
    }

    pub fn set_summary(&self, pair: &Pair, summary: Summary) {
        self.summaries.write().insert(pair.clone(), summary);
    }

    pub fn set_trade_volume(&self, pair: &Pair, buy: Decimal, sell: Decimal) {
        self.volumes.write().insert(pair.clone(), TradeVolume { buy, sell });
    }

    pub fn set_ticker(&self, pair: &Pair, ticker: TickerSnapshot) {
        self.tickers.write().insert(pair.clone(), ticker);
    }

    pub fn fail_pair(&self, pair: &Pair) {
        self.pairs.write().insert(pair.clone());
        self.failing.write().insert(pair.clone());
    }

    pub fn recover_pair(&self, pair: &Pair) {
        self.failing.write().remove(pair);
    }

    /// Pairs whose candles were requested, in request order
    pub fn candle_requests(&self) -> Vec<Pair> {
        self.candle_requests.lock().clone()
    }

    fn check(&self, pair: &Pair, endpoint: &str) -> Result<(), AdapterError> {
        if self.failing.read().contains(pair) {
            return Err(AdapterError::Status {
                status: 502,
                url: format!("mock://api/{}/{}", pair, endpoint),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MarketSource for StaticMarketSource {
    async fn list_pairs(&self) -> indodax_adapter::Result<Vec<Pair>> {
        Ok(self.pairs.read().iter().cloned().collect())
    }

    async fn get_summary(&self, pair: &Pair) -> indodax_adapter::Result<Summary> {
        self.check(pair, "ticker")?;
        if let Some(summary) = self.summaries.read().get(pair) {
            return Ok(*summary);
        }
        let candles = self.candles.read();
        let points = candles
            .get(pair)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AdapterError::UnknownPair(pair.to_string()))?;
        let to_decimal = |v: f64| Decimal::try_from(v).unwrap_or_default();
        let high = points.iter().map(|p| p.high).fold(f64::MIN, f64::max);
        let low = points.iter().map(|p| p.low).fold(f64::MAX, f64::min);
        let last = points.last().map(|p| p.close).unwrap_or_default();
        Ok(Summary {
            high: to_decimal(high),
            low: to_decimal(low),
            last: to_decimal(last),
        })
    }

    async fn get_candles(
        &self,
        pair: &Pair,
        _timeframe: Timeframe,
        limit: usize,
    ) -> indodax_adapter::Result<Vec<PricePoint>> {
        self.candle_requests.lock().push(pair.clone());
        self.check(pair, "trades")?;
        let candles = self.candles.read();
        let points = candles
            .get(pair)
            .ok_or_else(|| AdapterError::UnknownPair(pair.to_string()))?;
        let skip = points.len().saturating_sub(limit);
        Ok(points[skip..].to_vec())
    }

    async fn get_all_tickers(&self) -> indodax_adapter::Result<BTreeMap<Pair, TickerSnapshot>> {
        Ok(self.tickers.read().clone())
    }

    async fn get_trade_volume(&self, pair: &Pair) -> indodax_adapter::Result<TradeVolume> {
        self.check(pair, "trades")?;
        self.volumes
            .read()
            .get(pair)
            .copied()
            .ok_or_else(|| AdapterError::UnknownPair(pair.to_string()))
    }
}

fn hourly(closes: impl IntoIterator<Item = (f64, f64)>) -> Vec<PricePoint> {
    closes
        .into_iter()
        .enumerate()
        .filter_map(|(i, (close, volume))| {
            Some(PricePoint {
                timestamp: DateTime::from_timestamp(SERIES_START + i as i64 * 3600, 0)?,
                open: close,
                high: close,
                low: close,
                close,
                volume,
            })
        })
        .collect()
}

/// Constant close and volume; produces no events
pub fn flat_series(len: usize, close: f64, volume: f64) -> Vec<PricePoint> {
    hourly((0..len).map(|_| (close, volume)))
}

/// Flat series whose last volume is `multiple` times the rest
pub fn volume_spike_series(len: usize, multiple: f64) -> Vec<PricePoint> {
    let mut points = flat_series(len, 100.0, 10.0);
    if let Some(last) = points.last_mut() {
        last.volume = 10.0 * multiple;
    }
    points
}

/// Accelerating rally with constant volume; ends RSI overbought
pub fn rally_series(len: usize) -> Vec<PricePoint> {
    hourly((0..len).map(|i| (100.0 + (i * i) as f64, 10.0)))
}

pub fn ticker(last: Decimal, buy: Decimal, sell: Decimal, vol_idr: Decimal, change: Option<Decimal>) -> TickerSnapshot {
    TickerSnapshot {
        last,
        buy,
        sell,
        vol_idr,
        high: last,
        low: last,
        change,
    }
}
