//! Deduplication ledger of delivered alerts
//!
//! One ledger per session, shared by `Arc` between the scheduled scan, the
//! snapshot task and the console. A `(pair, signal_text)` pair is delivered
//! at most once until [`SignalLedger::reset`].

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use types::{Pair, SentSignalRecord};

type Key = (Pair, String);

#[derive(Debug, Default)]
struct LedgerState {
    sent: HashSet<Key>,
    records: Vec<SentSignalRecord>,
    in_flight: HashSet<Key>,
}

#[derive(Debug, Default)]
pub struct SignalLedger {
    state: Mutex<LedgerState>,
}

impl SignalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// `false` iff this exact `(pair, text)` was already delivered
    pub fn should_notify(&self, pair: &Pair, signal_text: &str) -> bool {
        !self
            .state
            .lock()
            .sent
            .contains(&(pair.clone(), signal_text.to_string()))
    }

    /// Mark an alert delivered; a duplicate is refused and returns `false`
    pub fn record(&self, pair: &Pair, signal_text: &str, sent_at: DateTime<Utc>) -> bool {
        let mut state = self.state.lock();
        Self::insert(&mut state, pair, signal_text, sent_at)
    }

    fn insert(state: &mut LedgerState, pair: &Pair, signal_text: &str, sent_at: DateTime<Utc>) -> bool {
        if !state.sent.insert((pair.clone(), signal_text.to_string())) {
            return false;
        }
        state.records.push(SentSignalRecord {
            pair: pair.clone(),
            signal_text: signal_text.to_string(),
            sent_at,
        });
        true
    }

    /// Clear every record; returns how many were cleared
    pub fn reset(&self) -> usize {
        let mut state = self.state.lock();
        let cleared = state.records.len();
        state.sent.clear();
        state.records.clear();
        debug!("Ledger reset, {} records cleared", cleared);
        cleared
    }

    /// Reserve a dispatch slot for `(pair, text)`
    ///
    /// Returns `None` when the alert was already delivered or another task
    /// holds the slot. Commit the returned guard after a successful send;
    /// dropping it uncommitted releases the slot without recording.
    pub fn begin(self: &Arc<Self>, pair: &Pair, signal_text: &str) -> Option<PendingDispatch> {
        let key = (pair.clone(), signal_text.to_string());
        let mut state = self.state.lock();
        if state.sent.contains(&key) || !state.in_flight.insert(key.clone()) {
            return None;
        }
        Some(PendingDispatch {
            ledger: Arc::clone(self),
            key: Some(key),
        })
    }

    pub fn records(&self) -> Vec<SentSignalRecord> {
        self.state.lock().records.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-flight reservation handed out by [`SignalLedger::begin`]
#[derive(Debug)]
pub struct PendingDispatch {
    ledger: Arc<SignalLedger>,
    key: Option<Key>,
}

impl PendingDispatch {
    pub fn pair(&self) -> Option<&Pair> {
        self.key.as_ref().map(|(pair, _)| pair)
    }

    /// Record the delivery and release the slot
    pub fn commit(mut self, sent_at: DateTime<Utc>) -> bool {
        let Some((pair, text)) = self.key.take() else {
            return false;
        };
        let mut state = self.ledger.state.lock();
        state.in_flight.remove(&(pair.clone(), text.clone()));
        SignalLedger::insert(&mut state, &pair, &text, sent_at)
    }
}

impl Drop for PendingDispatch {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.ledger.state.lock().in_flight.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pair(s: &str) -> Pair {
        Pair::new(s).unwrap()
    }

    #[test]
    fn test_record_blocks_until_reset() {
        let ledger = SignalLedger::new();
        let btc = pair("btc_idr");

        assert!(ledger.should_notify(&btc, "RSI Overbought"));
        assert!(ledger.record(&btc, "RSI Overbought", Utc::now()));
        assert!(!ledger.should_notify(&btc, "RSI Overbought"));

        // different text or pair is a different alert
        assert!(ledger.should_notify(&btc, "RSI Overbought; Volume Spike"));
        assert!(ledger.should_notify(&pair("eth_idr"), "RSI Overbought"));

        assert_eq!(ledger.reset(), 1);
        assert!(ledger.should_notify(&btc, "RSI Overbought"));
        assert_eq!(ledger.reset(), 0);
    }

    #[test]
    fn test_duplicate_record_refused() {
        let ledger = SignalLedger::new();
        let btc = pair("btc_idr");
        assert!(ledger.record(&btc, "Volume Spike", Utc::now()));
        assert!(!ledger.record(&btc, "Volume Spike", Utc::now()));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_pending_dispatch_commit() {
        let ledger = Arc::new(SignalLedger::new());
        let btc = pair("btc_idr");

        let pending = ledger.begin(&btc, "MACD Bullish Crossover").unwrap();
        assert!(ledger.begin(&btc, "MACD Bullish Crossover").is_none());
        assert!(ledger.should_notify(&btc, "MACD Bullish Crossover"));

        assert!(pending.commit(Utc::now()));
        assert!(!ledger.should_notify(&btc, "MACD Bullish Crossover"));
        assert!(ledger.begin(&btc, "MACD Bullish Crossover").is_none());
        assert_eq!(ledger.records()[0].signal_text, "MACD Bullish Crossover");
    }

    #[test]
    fn test_dropped_dispatch_releases_slot() {
        let ledger = Arc::new(SignalLedger::new());
        let btc = pair("btc_idr");

        {
            let _pending = ledger.begin(&btc, "RSI Oversold").unwrap();
        }
        assert!(ledger.is_empty());
        assert!(ledger.begin(&btc, "RSI Oversold").is_some());
    }

    #[test]
    fn test_concurrent_begin_single_winner() {
        let ledger = Arc::new(SignalLedger::new());
        let btc = pair("btc_idr");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let btc = btc.clone();
                std::thread::spawn(move || {
                    ledger
                        .begin(&btc, "Volume Spike")
                        .map(|pending| pending.commit(Utc::now()))
                        .unwrap_or(false)
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(ledger.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_should_notify_idempotent(text in "[A-Za-z ;]{1,40}") {
            let ledger = SignalLedger::new();
            let btc = pair("btc_idr");
            let first = ledger.should_notify(&btc, &text);
            prop_assert_eq!(first, ledger.should_notify(&btc, &text));

            ledger.record(&btc, &text, Utc::now());
            prop_assert!(!ledger.should_notify(&btc, &text));
            prop_assert!(!ledger.should_notify(&btc, &text));

            ledger.reset();
            ledger.reset();
            prop_assert!(ledger.should_notify(&btc, &text));
        }

        #[test]
        fn prop_records_unique(texts in proptest::collection::vec("[a-c]{1,2}", 0..30)) {
            let ledger = SignalLedger::new();
            let btc = pair("btc_idr");
            for text in &texts {
                ledger.record(&btc, text, Utc::now());
            }
            let unique: HashSet<_> = texts.iter().collect();
            prop_assert_eq!(ledger.len(), unique.len());
        }
    }
}
