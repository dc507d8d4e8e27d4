//! Market overview: per-pair classification board and top movers

use crate::signals::{classify_with_ratio, position_suggestion, pressure_label};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;
use types::{Classification, MarketSignal, Pair, TickerSnapshot};

/// One row of the market overview table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketRow {
    pub pair: Pair,
    pub last: Decimal,
    pub buy: Decimal,
    pub sell: Decimal,
    pub vol_idr: Decimal,
    pub classification: Classification,
    pub suggestion: &'static str,
    pub pressure: &'static str,
    /// High/low range over the low, in percent
    pub spike_pct: Decimal,
}

/// Latest classification per pair; each update replaces the previous one
#[derive(Debug, Default)]
pub struct MarketSignalBoard {
    signals: RwLock<HashMap<Pair, MarketSignal>>,
}

impl MarketSignalBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, signal: MarketSignal) {
        self.signals.write().insert(signal.pair.clone(), signal);
    }

    pub fn get(&self, pair: &Pair) -> Option<MarketSignal> {
        self.signals.read().get(pair).cloned()
    }

    pub fn len(&self) -> usize {
        self.signals.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of pairs per classification, strongest buy first
    pub fn counts(&self) -> Vec<(Classification, usize)> {
        let signals = self.signals.read();
        let mut counts: Vec<(Classification, usize)> = [
            Classification::StrongBuy,
            Classification::Buy,
            Classification::Hold,
            Classification::Sell,
            Classification::StrongSell,
        ]
        .into_iter()
        .map(|c| (c, signals.values().filter(|s| s.classification == c).count()))
        .collect();
        counts.sort_by(|a, b| b.0.rank().cmp(&a.0.rank()));
        counts
    }
}

/// Classify every ticker, update the board and return rows by IDR volume
pub fn build_rows(
    tickers: &BTreeMap<Pair, TickerSnapshot>,
    strong_ratio: Decimal,
    board: &MarketSignalBoard,
    at: DateTime<Utc>,
) -> Vec<MarketRow> {
    let mut rows = Vec::with_capacity(tickers.len());
    for (pair, ticker) in tickers {
        let classification = match classify_with_ratio(ticker.buy, ticker.sell, strong_ratio) {
            Ok(c) => c,
            Err(e) => {
                warn!("Skipping {} in overview: {}", pair, e);
                continue;
            }
        };
        board.update(MarketSignal {
            pair: pair.clone(),
            classification,
            buy_volume: ticker.buy,
            sell_volume: ticker.sell,
            computed_at: at,
        });
        rows.push(MarketRow {
            pair: pair.clone(),
            last: ticker.last,
            buy: ticker.buy,
            sell: ticker.sell,
            vol_idr: ticker.vol_idr,
            classification,
            suggestion: position_suggestion(classification),
            pressure: pressure_label(ticker.buy, ticker.sell),
            spike_pct: ticker.spike_pct(),
        });
    }
    rows.sort_by(|a, b| b.vol_idr.cmp(&a.vol_idr));
    rows
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopMovers {
    pub gainers: Vec<(Pair, TickerSnapshot)>,
    pub losers: Vec<(Pair, TickerSnapshot)>,
    pub volume: Vec<(Pair, TickerSnapshot)>,
}

/// Top `n` by 24h change (both directions) and by IDR volume
///
/// Tickers without a change value only take part in the volume list.
pub fn top_movers(tickers: &BTreeMap<Pair, TickerSnapshot>, n: usize) -> TopMovers {
    let entries: Vec<(Pair, TickerSnapshot)> =
        tickers.iter().map(|(p, t)| (p.clone(), t.clone())).collect();

    let mut with_change: Vec<_> = entries.iter().filter(|(_, t)| t.change.is_some()).cloned().collect();
    with_change.sort_by(|a, b| b.1.change.cmp(&a.1.change));
    let gainers = with_change.iter().take(n).cloned().collect();
    with_change.reverse();
    let losers = with_change.into_iter().take(n).collect();

    let mut volume = entries;
    volume.sort_by(|a, b| b.1.vol_idr.cmp(&a.1.vol_idr));
    volume.truncate(n);

    TopMovers {
        gainers,
        losers,
        volume,
    }
}

/// Format a price for display with thousands separators
///
/// USD-quoted pairs get 8 decimals; IDR pairs 0 decimals at or above 1 and 6
/// below; anything else 2.
pub fn format_price(price: Decimal, pair: &Pair) -> String {
    let decimals = if pair.is_usd_quoted() {
        8
    } else if pair.is_idr_quoted() {
        if price >= Decimal::ONE {
            0
        } else {
            6
        }
    } else {
        2
    };
    format_decimal(price, decimals)
}

/// Whole-rupiah amount with thousands separators
pub fn format_idr(amount: Decimal) -> String {
    format_decimal(amount, 0)
}

fn format_decimal(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp(decimals);
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    if decimals == 0 {
        return format!("{}{}", sign, grouped);
    }
    let mut frac = frac_part.to_string();
    while frac.len() < decimals as usize {
        frac.push('0');
    }
    format!("{}{}.{}", sign, grouped, frac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pair(s: &str) -> Pair {
        Pair::new(s).unwrap()
    }

    fn ticker(buy: Decimal, sell: Decimal, vol_idr: Decimal, change: Option<Decimal>) -> TickerSnapshot {
        TickerSnapshot {
            last: dec!(1000),
            buy,
            sell,
            vol_idr,
            high: dec!(1100),
            low: dec!(1000),
            change,
        }
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(dec!(1050000000), &pair("btc_idr")), "1,050,000,000");
        assert_eq!(format_price(dec!(999.6), &pair("doge_idr")), "1,000");
        assert_eq!(format_price(dec!(0.0001234), &pair("pepe_idr")), "0.000123");
        assert_eq!(format_price(dec!(0.5), &pair("btc_usdt")), "0.50000000");
        assert_eq!(format_price(dec!(1234.5), &pair("eth_btc")), "1,234.50");
        assert_eq!(format_price(dec!(12), &pair("eth_btc")), "12.00");
    }

    #[test]
    fn test_rows_sorted_by_volume_and_board_overwritten() {
        let board = MarketSignalBoard::new();
        let mut tickers = BTreeMap::new();
        tickers.insert(pair("ada_idr"), ticker(dec!(100), dec!(100), dec!(10), None));
        tickers.insert(pair("btc_idr"), ticker(dec!(200), dec!(100), dec!(500), None));

        let rows = build_rows(&tickers, dec!(1.2), &board, Utc::now());
        assert_eq!(rows[0].pair.as_str(), "btc_idr");
        assert_eq!(rows[0].classification, Classification::StrongBuy);
        assert_eq!(rows[0].suggestion, "Consider LONG");
        assert_eq!(rows[0].spike_pct, dec!(10));
        assert_eq!(rows[1].classification, Classification::Hold);
        assert_eq!(rows[1].suggestion, "-");

        tickers.insert(pair("btc_idr"), ticker(dec!(100), dec!(200), dec!(500), None));
        build_rows(&tickers, dec!(1.2), &board, Utc::now());
        assert_eq!(board.len(), 2);
        assert_eq!(
            board.get(&pair("btc_idr")).unwrap().classification,
            Classification::StrongSell
        );

        let counts = board.counts();
        assert_eq!(counts[0], (Classification::StrongBuy, 0));
        assert_eq!(counts[2], (Classification::Hold, 1));
        assert_eq!(counts[4], (Classification::StrongSell, 1));
    }

    #[test]
    fn test_top_movers() {
        let mut tickers = BTreeMap::new();
        tickers.insert(pair("a_idr"), ticker(dec!(1), dec!(1), dec!(300), Some(dec!(5))));
        tickers.insert(pair("b_idr"), ticker(dec!(1), dec!(1), dec!(100), Some(dec!(-3))));
        tickers.insert(pair("c_idr"), ticker(dec!(1), dec!(1), dec!(200), Some(dec!(1))));
        tickers.insert(pair("d_idr"), ticker(dec!(1), dec!(1), dec!(900), None));

        fn names(list: &[(Pair, TickerSnapshot)]) -> Vec<String> {
            list.iter().map(|(p, _)| p.to_string()).collect()
        }

        let movers = top_movers(&tickers, 2);
        assert_eq!(names(&movers.gainers), vec!["a_idr", "c_idr"]);
        assert_eq!(names(&movers.losers), vec!["b_idr", "c_idr"]);
        assert_eq!(names(&movers.volume), vec!["d_idr", "a_idr"]);
    }
}
