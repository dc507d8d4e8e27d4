//! Market identifiers and normalized exchange records

use crate::errors::TypesError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A tradable market symbol such as `btc_idr`
///
/// Stored lowercase. Only ASCII alphanumerics and `_` are accepted, which is
/// the alphabet the exchange uses for its pair keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pair(String);

impl Pair {
    pub fn new(symbol: impl AsRef<str>) -> Result<Self, TypesError> {
        let raw = symbol.as_ref();
        let normalized = raw.trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(TypesError::InvalidPair {
                symbol: raw.to_string(),
                reason: "symbol is empty".to_string(),
            });
        }

        if let Some(bad) = normalized
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(TypesError::InvalidPair {
                symbol: raw.to_string(),
                reason: format!("unexpected character '{}'", bad),
            });
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercase form used in notification text
    pub fn display_upper(&self) -> String {
        self.0.to_ascii_uppercase()
    }

    /// Quoted in a USD-like stablecoin (`usdt`, `usdc`, `usd`)
    pub fn is_usd_quoted(&self) -> bool {
        self.0.contains("usd")
    }

    pub fn is_idr_quoted(&self) -> bool {
        self.0.contains("idr")
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Pair {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Pair {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Pair> for String {
    fn from(pair: Pair) -> Self {
        pair.0
    }
}

/// Candle resampling bucket width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "5min", alias = "5m")]
    FiveMinutes,
    #[serde(rename = "15min", alias = "15m")]
    FifteenMinutes,
    #[serde(rename = "30min", alias = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1H", alias = "1h")]
    OneHour,
    #[serde(rename = "4H", alias = "4h")]
    FourHours,
    #[serde(rename = "1D", alias = "1d")]
    OneDay,
}

impl Timeframe {
    pub const ALL: [Timeframe; 6] = [
        Timeframe::FiveMinutes,
        Timeframe::FifteenMinutes,
        Timeframe::ThirtyMinutes,
        Timeframe::OneHour,
        Timeframe::FourHours,
        Timeframe::OneDay,
    ];

    pub fn as_secs(self) -> i64 {
        match self {
            Timeframe::FiveMinutes => 300,
            Timeframe::FifteenMinutes => 900,
            Timeframe::ThirtyMinutes => 1_800,
            Timeframe::OneHour => 3_600,
            Timeframe::FourHours => 14_400,
            Timeframe::OneDay => 86_400,
        }
    }

    /// Short label, also the serde and config representation
    pub fn label(self) -> &'static str {
        match self {
            Timeframe::FiveMinutes => "5min",
            Timeframe::FifteenMinutes => "15min",
            Timeframe::ThirtyMinutes => "30min",
            Timeframe::OneHour => "1H",
            Timeframe::FourHours => "4H",
            Timeframe::OneDay => "1D",
        }
    }

    /// Start of the bucket containing `timestamp`, aligned to the Unix epoch
    pub fn bucket_start(self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let secs = timestamp.timestamp();
        let aligned = secs - secs.rem_euclid(self.as_secs());
        DateTime::from_timestamp(aligned, 0).unwrap_or(timestamp)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "5min" | "5m" => Ok(Timeframe::FiveMinutes),
            "15min" | "15m" => Ok(Timeframe::FifteenMinutes),
            "30min" | "30m" => Ok(Timeframe::ThirtyMinutes),
            "1h" | "60min" => Ok(Timeframe::OneHour),
            "4h" => Ok(Timeframe::FourHours),
            "1d" => Ok(Timeframe::OneDay),
            _ => Err(TypesError::UnknownTimeframe(s.to_string())),
        }
    }
}

/// One resampled OHLCV interval of one pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A single public trade as reported by the exchange
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub amount: f64,
    pub side: TradeSide,
}

/// 24h price summary for one pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub high: Decimal,
    pub low: Decimal,
    pub last: Decimal,
}

impl Summary {
    /// Percentage the last price sits above the 24h low, `None` when low is zero
    pub fn percent_from_low(&self) -> Option<Decimal> {
        if self.low.is_zero() {
            return None;
        }
        Some((self.last - self.low) / self.low * Decimal::ONE_HUNDRED)
    }
}

/// Validated entry of the all-tickers payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub last: Decimal,
    pub buy: Decimal,
    pub sell: Decimal,
    pub vol_idr: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    /// 24h change percentage; not every payload carries it
    pub change: Option<Decimal>,
}

impl TickerSnapshot {
    /// High/low range as a percentage of the low, zero when low is zero
    pub fn spike_pct(&self) -> Decimal {
        if self.low.is_zero() {
            return Decimal::ZERO;
        }
        (self.high - self.low) / self.low * Decimal::ONE_HUNDRED
    }
}
