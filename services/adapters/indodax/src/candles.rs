//! Trade-to-candle resampling
//!
//! The public API has no OHLC endpoint, so candles are built from the recent
//! trades list: trades are bucketed by epoch-aligned timeframe, empty buckets
//! are dropped, and volume is the summed trade amount.

use crate::parse::TradeRecord;
use std::collections::BTreeMap;
use types::{PricePoint, Timeframe};

/// Resample trades into time-ascending price points
///
/// `limit` keeps only the most recent candles; `None` keeps all of them.
pub fn resample(trades: &[TradeRecord], timeframe: Timeframe, limit: Option<usize>) -> Vec<PricePoint> {
    let mut ordered: Vec<_> = trades.iter().filter_map(|t| Some((t.tid, t.to_trade()?))).collect();
    // Exchange returns newest first; tid breaks ties within a second.
    ordered.sort_by(|(tid_a, a), (tid_b, b)| a.timestamp.cmp(&b.timestamp).then(tid_a.cmp(tid_b)));

    let mut buckets: BTreeMap<i64, PricePoint> = BTreeMap::new();
    for (_, trade) in ordered {
        let start = timeframe.bucket_start(trade.timestamp);
        buckets
            .entry(start.timestamp())
            .and_modify(|candle| {
                candle.high = candle.high.max(trade.price);
                candle.low = candle.low.min(trade.price);
                candle.close = trade.price;
                candle.volume += trade.amount;
            })
            .or_insert(PricePoint {
                timestamp: start,
                open: trade.price,
                high: trade.price,
                low: trade.price,
                close: trade.price,
                volume: trade.amount,
            });
    }

    let mut candles: Vec<PricePoint> = buckets.into_values().collect();
    if let Some(limit) = limit {
        if candles.len() > limit {
            candles.drain(..candles.len() - limit);
        }
    }
    candles
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use types::TradeSide;

    fn trade(tid: u64, secs: i64, price: &str, amount: &str) -> TradeRecord {
        TradeRecord {
            tid: Some(tid),
            timestamp: DateTime::from_timestamp(secs, 0).unwrap(),
            price: Decimal::from_str(price).unwrap(),
            amount: Decimal::from_str(amount).unwrap(),
            side: TradeSide::Buy,
        }
    }

    #[test]
    fn test_resample_ohlcv() {
        // newest first, as served by the exchange
        let trades = vec![
            trade(5, 3_900, "105", "1"),
            trade(4, 3_650, "99", "2"),
            trade(3, 3_610, "110", "1"),
            trade(2, 3_605, "101", "0.5"),
            trade(1, 3_600, "100", "1"),
        ];
        let candles = resample(&trades, Timeframe::FiveMinutes, None);
        assert_eq!(candles.len(), 2);

        let first = candles[0];
        assert_eq!(first.timestamp.timestamp(), 3_600);
        assert_eq!(first.open, 100.0);
        assert_eq!(first.high, 110.0);
        assert_eq!(first.low, 99.0);
        assert_eq!(first.close, 99.0);
        assert_eq!(first.volume, 4.5);

        let second = candles[1];
        assert_eq!(second.timestamp.timestamp(), 3_900);
        assert_eq!(second.open, 105.0);
    }

    #[test]
    fn test_empty_buckets_are_dropped() {
        let trades = vec![trade(2, 7_200, "10", "1"), trade(1, 0, "9", "1")];
        let candles = resample(&trades, Timeframe::OneHour, None);
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].timestamp.timestamp() - candles[0].timestamp.timestamp(), 7_200);
    }

    #[test]
    fn test_limit_keeps_latest() {
        let trades: Vec<_> = (0..10).map(|i| trade(i, i as i64 * 300, "1", "1")).collect();
        let candles = resample(&trades, Timeframe::FiveMinutes, Some(3));
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[0].timestamp.timestamp(), 7 * 300);
        assert!(resample(&[], Timeframe::OneHour, Some(3)).is_empty());
    }
}
