//! Signal detection and buy/sell classification

use crate::config::ThresholdConfig;
use crate::error::ClassifyError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use types::{Classification, IndicatorFrame, MarketSignal, Pair, SignalEvent, SignalKind, Timeframe};

/// Buy volume must exceed this multiple of sell volume for STRONG BUY (and vice versa)
pub const DEFAULT_STRONG_RATIO: Decimal = dec!(1.2);

/// Volume spike threshold supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeSpikeRule {
    pub multiplier: f64,
}

impl Default for VolumeSpikeRule {
    fn default() -> Self {
        Self { multiplier: 2.0 }
    }
}

impl VolumeSpikeRule {
    /// Multiple of the trailing average when the frame is a spike
    pub fn spike_ratio(&self, frame: &IndicatorFrame) -> Option<Option<f64>> {
        let avg = frame.volume_avg?;
        if frame.volume() > self.multiplier * avg {
            Some((avg > 0.0).then(|| frame.volume() / avg))
        } else {
            None
        }
    }
}

/// Detect events on the latest frame, using the previous frame for MACD crosses
///
/// Events come back in message order: RSI, MACD, volume. A frame whose
/// required field is `None` never produces the corresponding event.
pub fn detect_events(
    pair: &Pair,
    timeframe: Timeframe,
    frames: &[IndicatorFrame],
    thresholds: &ThresholdConfig,
    detected_at: DateTime<Utc>,
) -> Vec<SignalEvent> {
    let Some(latest) = frames.last() else {
        return Vec::new();
    };
    let previous = frames.len().checked_sub(2).map(|i| &frames[i]);
    let event = |kind, value| SignalEvent::new(pair.clone(), timeframe, kind, value, detected_at);

    let mut events = Vec::new();

    if let Some(rsi) = latest.rsi {
        if rsi > thresholds.rsi_overbought {
            events.push(event(SignalKind::RsiOverbought, Some(rsi)));
        } else if rsi < thresholds.rsi_oversold {
            events.push(event(SignalKind::RsiOversold, Some(rsi)));
        }
    }

    if let (Some(macd), Some(signal), Some(prev_hist)) = (
        latest.macd,
        latest.macd_signal,
        previous.and_then(|p| p.macd_hist),
    ) {
        if macd > signal && prev_hist <= 0.0 {
            events.push(event(SignalKind::MacdBullishCross, latest.macd_hist));
        } else if macd < signal && prev_hist >= 0.0 {
            events.push(event(SignalKind::MacdBearishCross, latest.macd_hist));
        }
    }

    let rule = VolumeSpikeRule {
        multiplier: thresholds.volume_spike_multiplier,
    };
    if let Some(ratio) = rule.spike_ratio(latest) {
        events.push(event(SignalKind::VolumeSpike, ratio));
    }

    events
}

/// Dedup text: stable labels joined with `"; "` in event order
pub fn join_labels(events: &[SignalEvent]) -> String {
    events
        .iter()
        .map(|e| e.label.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Classify buy/sell pressure with the default 1.2 dominance ratio
pub fn classify(buy: Decimal, sell: Decimal) -> Result<Classification, ClassifyError> {
    classify_with_ratio(buy, sell, DEFAULT_STRONG_RATIO)
}

/// Strict cascade: STRONG BUY, BUY, HOLD, STRONG SELL, SELL
///
/// Zero sell volume with positive buy volume is STRONG BUY (and the mirror
/// case STRONG SELL); both zero is HOLD.
pub fn classify_with_ratio(
    buy: Decimal,
    sell: Decimal,
    strong_ratio: Decimal,
) -> Result<Classification, ClassifyError> {
    if buy < Decimal::ZERO || sell < Decimal::ZERO {
        return Err(ClassifyError::NegativeVolume { buy, sell });
    }

    let classification = if buy > strong_ratio * sell {
        Classification::StrongBuy
    } else if buy > sell {
        Classification::Buy
    } else if buy == sell {
        Classification::Hold
    } else if sell > strong_ratio * buy {
        Classification::StrongSell
    } else {
        Classification::Sell
    };
    Ok(classification)
}

pub fn market_signal(
    pair: Pair,
    buy: Decimal,
    sell: Decimal,
    strong_ratio: Decimal,
    computed_at: DateTime<Utc>,
) -> Result<MarketSignal, ClassifyError> {
    Ok(MarketSignal {
        classification: classify_with_ratio(buy, sell, strong_ratio)?,
        pair,
        buy_volume: buy,
        sell_volume: sell,
        computed_at,
    })
}

pub fn position_suggestion(classification: Classification) -> &'static str {
    match classification {
        Classification::StrongBuy | Classification::Buy => "Consider LONG",
        Classification::StrongSell | Classification::Sell => "Consider SHORT",
        Classification::Hold => "-",
    }
}

pub fn pressure_label(buy: Decimal, sell: Decimal) -> &'static str {
    if buy > sell {
        "Demand > Supply"
    } else if sell > buy {
        "Supply > Demand"
    } else {
        "Balanced"
    }
}

/// Alert body for the periodic scan
pub fn format_scan_alert(pair: &Pair, timeframe: Timeframe, events: &[SignalEvent]) -> String {
    let mut message = format!("🚨 Auto-scan signal on {} ({}):", pair.display_upper(), timeframe);
    for event in events {
        message.push_str("\n- ");
        message.push_str(&event.detail());
    }
    message
}
