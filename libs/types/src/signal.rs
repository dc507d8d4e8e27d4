//! Signal definitions shared by the scanner, ledger and audit log

use crate::market::{Pair, Timeframe};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Technical event detected on the latest frames of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    MacdBullishCross,
    MacdBearishCross,
    RsiOverbought,
    RsiOversold,
    VolumeSpike,
}

impl SignalKind {
    /// Stable human label; this is the text the dedup ledger compares
    pub fn label(self) -> &'static str {
        match self {
            SignalKind::MacdBullishCross => "MACD Bullish Crossover",
            SignalKind::MacdBearishCross => "MACD Bearish Crossover",
            SignalKind::RsiOverbought => "RSI Overbought",
            SignalKind::RsiOversold => "RSI Oversold",
            SignalKind::VolumeSpike => "Volume Spike",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub pair: Pair,
    pub timeframe: Timeframe,
    pub kind: SignalKind,
    pub label: String,
    /// Indicator reading behind the event (RSI value, volume multiple, histogram)
    pub value: Option<f64>,
    pub detected_at: DateTime<Utc>,
}

impl SignalEvent {
    pub fn new(
        pair: Pair,
        timeframe: Timeframe,
        kind: SignalKind,
        value: Option<f64>,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            pair,
            timeframe,
            kind,
            label: kind.label().to_string(),
            value,
            detected_at,
        }
    }

    /// Label with the triggering reading, used in message bodies and the audit log
    pub fn detail(&self) -> String {
        match (self.kind, self.value) {
            (SignalKind::RsiOverbought | SignalKind::RsiOversold, Some(rsi)) => {
                format!("{} ({:.2})", self.label, rsi)
            }
            (SignalKind::VolumeSpike, Some(multiple)) => {
                format!("{} ({:.2}x avg)", self.label, multiple)
            }
            _ => self.label.clone(),
        }
    }
}

/// Buy/sell pressure classification of one pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "STRONG SELL")]
    StrongSell,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::StrongBuy => "STRONG BUY",
            Classification::Buy => "BUY",
            Classification::Hold => "HOLD",
            Classification::Sell => "SELL",
            Classification::StrongSell => "STRONG SELL",
        }
    }

    /// Sort key, strongest buy first when sorted descending
    pub fn rank(self) -> u8 {
        match self {
            Classification::StrongBuy => 4,
            Classification::Buy => 3,
            Classification::Hold => 2,
            Classification::Sell => 1,
            Classification::StrongSell => 0,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest classification of one pair; replaced on every ticker poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSignal {
    pub pair: Pair,
    pub classification: Classification,
    pub buy_volume: Decimal,
    pub sell_volume: Decimal,
    pub computed_at: DateTime<Utc>,
}

/// A notification the ledger has seen delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentSignalRecord {
    pub pair: Pair,
    pub signal_text: String,
    pub sent_at: DateTime<Utc>,
}

/// One row of the auto-scan audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertLogEntry {
    pub timestamp: DateTime<Utc>,
    pub pair: Pair,
    pub signals: Vec<String>,
}

impl AlertLogEntry {
    pub fn signals_csv(&self) -> String {
        self.signals.join(", ")
    }
}
