//! Payload parsing for the Indodax public API
//!
//! The exchange reports numbers as JSON strings (`"last": "612000000"`) and
//! occasionally as bare numbers. Every numeric field goes through
//! [`decimal_field`], so missing or malformed values are handled in one place
//! according to the configured [`ParsePolicy`].

use crate::error::{AdapterError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, warn};
use types::{Pair, Summary, TickerSnapshot, Trade, TradeSide};

/// How to treat a ticker field the exchange omitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsePolicy {
    /// Missing fields are an error
    Strict,
    /// Missing fields become zero, with a warning
    #[default]
    DefaultMissingToZero,
}

/// A trade with the exact values the exchange reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRecord {
    pub tid: Option<u64>,
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    pub amount: Decimal,
    pub side: TradeSide,
}

impl TradeRecord {
    pub fn to_trade(&self) -> Option<Trade> {
        Some(Trade {
            timestamp: self.timestamp,
            price: self.price.to_f64()?,
            amount: self.amount.to_f64()?,
            side: self.side,
        })
    }
}

/// Summed base-currency amounts of recent trades, split by taker side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TradeVolume {
    pub buy: Decimal,
    pub sell: Decimal,
}

fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
        }
        Value::Number(n) => {
            let s = n.to_string();
            Decimal::from_str(&s)
                .or_else(|_| Decimal::from_scientific(&s))
                .ok()
        }
        _ => None,
    }
}

/// Parse a non-negative decimal field of a JSON object
pub fn decimal_field(
    object: &Map<String, Value>,
    field: &str,
    policy: ParsePolicy,
) -> Result<Decimal> {
    let value = match object.get(field) {
        Some(Value::Null) | None => {
            return match policy {
                ParsePolicy::Strict => Err(AdapterError::MissingField {
                    field: field.to_string(),
                }),
                ParsePolicy::DefaultMissingToZero => {
                    warn!("Field '{}' missing from payload, defaulting to 0", field);
                    Ok(Decimal::ZERO)
                }
            };
        }
        Some(value) => value,
    };

    let parsed = decimal_from_value(value).ok_or_else(|| AdapterError::InvalidNumeric {
        field: field.to_string(),
        value: value.to_string(),
    })?;

    if parsed.is_sign_negative() && !parsed.is_zero() {
        return Err(AdapterError::NegativeValue {
            field: field.to_string(),
            value: parsed.to_string(),
        });
    }
    Ok(parsed)
}

fn optional_decimal(object: &Map<String, Value>, field: &str) -> Option<Decimal> {
    object.get(field).and_then(decimal_from_value)
}

fn timestamp_field(object: &Map<String, Value>, field: &str) -> Result<DateTime<Utc>> {
    let value = object.get(field).ok_or_else(|| AdapterError::MissingField {
        field: field.to_string(),
    })?;
    let secs = match value {
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    };
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
        .ok_or_else(|| AdapterError::InvalidNumeric {
            field: field.to_string(),
            value: value.to_string(),
        })
}

fn as_object<'a>(value: &'a Value, context: &str) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| AdapterError::MissingField {
        field: context.to_string(),
    })
}

fn ticker_entry(entry: &Map<String, Value>, policy: ParsePolicy) -> Result<TickerSnapshot> {
    Ok(TickerSnapshot {
        last: decimal_field(entry, "last", policy)?,
        buy: decimal_field(entry, "buy", policy)?,
        sell: decimal_field(entry, "sell", policy)?,
        vol_idr: decimal_field(entry, "vol_idr", policy)?,
        high: decimal_field(entry, "high", policy)?,
        low: decimal_field(entry, "low", policy)?,
        change: optional_decimal(entry, "change"),
    })
}

/// Parse `/api/{pair}/ticker` into a [`Summary`]
///
/// A payload without a `ticker` object means the exchange does not list the
/// pair.
pub fn parse_summary(pair: &Pair, payload: &Value, policy: ParsePolicy) -> Result<Summary> {
    let ticker = payload
        .get("ticker")
        .and_then(Value::as_object)
        .ok_or_else(|| AdapterError::UnknownPair(pair.to_string()))?;

    Ok(Summary {
        high: decimal_field(ticker, "high", policy)?,
        low: decimal_field(ticker, "low", policy)?,
        last: decimal_field(ticker, "last", policy)?,
    })
}

/// Parse `/api/tickers` into a map keyed by pair, sorted by pair symbol
///
/// Entries that fail validation are skipped with a warning; the rest of the
/// payload is still usable.
pub fn parse_tickers(payload: &Value, policy: ParsePolicy) -> Result<BTreeMap<Pair, TickerSnapshot>> {
    let tickers = payload
        .get("tickers")
        .ok_or_else(|| AdapterError::MissingField {
            field: "tickers".to_string(),
        })
        .and_then(|v| as_object(v, "tickers"))?;

    let mut parsed = BTreeMap::new();
    for (key, entry) in tickers {
        let pair = match Pair::new(key) {
            Ok(pair) => pair,
            Err(e) => {
                debug!("Skipping ticker key '{}': {}", key, e);
                continue;
            }
        };
        let Some(entry) = entry.as_object() else {
            warn!("Ticker entry for {} is not an object, skipping", pair);
            continue;
        };
        match ticker_entry(entry, policy) {
            Ok(snapshot) => {
                parsed.insert(pair, snapshot);
            }
            Err(e) => warn!("Skipping ticker {}: {}", pair, e),
        }
    }
    Ok(parsed)
}

/// Pair keys of the `/api/tickers` payload in sorted order
pub fn parse_pair_list(payload: &Value) -> Result<Vec<Pair>> {
    let tickers = payload
        .get("tickers")
        .ok_or_else(|| AdapterError::MissingField {
            field: "tickers".to_string(),
        })
        .and_then(|v| as_object(v, "tickers"))?;

    let mut pairs: Vec<Pair> = tickers.keys().filter_map(|k| Pair::new(k).ok()).collect();
    pairs.sort();
    Ok(pairs)
}

/// Parse `/api/{pair}/trades`, skipping malformed rows
pub fn parse_trades(payload: &Value) -> Result<Vec<TradeRecord>> {
    let rows = payload.as_array().ok_or_else(|| AdapterError::MissingField {
        field: "trades[]".to_string(),
    })?;

    let mut trades = Vec::with_capacity(rows.len());
    for row in rows {
        match trade_row(row) {
            Ok(trade) => trades.push(trade),
            Err(e) => debug!("Skipping trade row {}: {}", row, e),
        }
    }
    Ok(trades)
}

fn trade_row(row: &Value) -> Result<TradeRecord> {
    let row = as_object(row, "trade")?;
    let side = match row.get("type").and_then(Value::as_str) {
        Some("buy") => TradeSide::Buy,
        Some("sell") => TradeSide::Sell,
        other => {
            return Err(AdapterError::InvalidNumeric {
                field: "type".to_string(),
                value: format!("{:?}", other),
            })
        }
    };
    let tid = row.get("tid").and_then(|v| match v {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    });

    Ok(TradeRecord {
        tid,
        timestamp: timestamp_field(row, "date")?,
        price: decimal_field(row, "price", ParsePolicy::Strict)?,
        amount: decimal_field(row, "amount", ParsePolicy::Strict)?,
        side,
    })
}

/// Sum trade amounts per side
pub fn trade_volume(trades: &[TradeRecord]) -> TradeVolume {
    trades.iter().fold(TradeVolume::default(), |mut acc, t| {
        match t.side {
            TradeSide::Buy => acc.buy += t.amount,
            TradeSide::Sell => acc.sell += t.amount,
        }
        acc
    })
}
