//! Scan orchestration: full-universe batches, interactive single-pair scans
//! and the market overview.

use crate::audit::{AuditSink, SignalLog};
use crate::config::{IndicatorConfig, ScanConfig, SignalsConfig, ThresholdConfig};
use crate::error::Result;
use crate::indicators::compute_indicators;
use crate::ledger::SignalLedger;
use crate::overview::{build_rows, format_price, top_movers, MarketRow, MarketSignalBoard, TopMovers};
use crate::signals::{
    classify_with_ratio, detect_events, format_scan_alert, join_labels, position_suggestion,
    pressure_label,
};
use crate::{log_error, log_metrics, log_scan, log_signal};
use chrono::Utc;
use indodax_adapter::MarketSource;
use notifier::Notifier;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};
use types::{AlertLogEntry, Pair, SignalEvent, Timeframe};

/// Collaborators of a [`Scanner`]
pub struct ScannerParts {
    pub source: Arc<dyn MarketSource>,
    pub notifier: Arc<dyn Notifier>,
    pub ledger: Arc<SignalLedger>,
    pub audit: Arc<dyn AuditSink>,
    pub signal_log: Arc<SignalLog>,
    pub board: Arc<MarketSignalBoard>,
}

/// Outcome counters of one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub universe: usize,
    pub scanned: usize,
    /// Pairs whose data could not be fetched or computed
    pub skipped: usize,
    /// Pairs with events that passed the ledger gate
    pub alerted: usize,
    /// Alerts the notifier accepted
    pub notified: usize,
    /// Pairs with events the ledger had already seen
    pub duplicates: usize,
    pub interrupted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractiveOutcome {
    NoSignal,
    AlreadySent { signal_text: String },
    Sent { message: String },
    DeliveryFailed { message: String },
}

#[derive(Debug, Clone, Default)]
pub struct MarketOverview {
    pub rows: Vec<MarketRow>,
    pub movers: TopMovers,
}

pub struct Scanner {
    source: Arc<dyn MarketSource>,
    notifier: Arc<dyn Notifier>,
    ledger: Arc<SignalLedger>,
    audit: Arc<dyn AuditSink>,
    signal_log: Arc<SignalLog>,
    board: Arc<MarketSignalBoard>,
    scan: ScanConfig,
    indicators: IndicatorConfig,
    thresholds: ThresholdConfig,
}

impl Scanner {
    pub fn new(parts: ScannerParts, config: &SignalsConfig) -> Self {
        Self {
            source: parts.source,
            notifier: parts.notifier,
            ledger: parts.ledger,
            audit: parts.audit,
            signal_log: parts.signal_log,
            board: parts.board,
            scan: config.scan.clone(),
            indicators: config.indicators.clone(),
            thresholds: config.thresholds.clone(),
        }
    }

    pub fn ledger(&self) -> &Arc<SignalLedger> {
        &self.ledger
    }

    pub fn board(&self) -> &Arc<MarketSignalBoard> {
        &self.board
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn scan_config(&self) -> &ScanConfig {
        &self.scan
    }

    /// Pairs of one batch: the configured list, or every listed pair
    pub async fn universe(&self) -> Result<Vec<Pair>> {
        let configured = self.scan.pair_universe()?;
        if !configured.is_empty() {
            return Ok(configured);
        }
        let mut pairs = self.source.list_pairs().await?;
        pairs.sort();
        Ok(pairs)
    }

    /// Fetch candles, compute indicators and detect events for one pair
    pub async fn scan_pair(&self, pair: &Pair, timeframe: Timeframe) -> Result<Vec<SignalEvent>> {
        let candles = self
            .source
            .get_candles(pair, timeframe, self.scan.candle_limit)
            .await?;
        let frames = compute_indicators(&candles, &self.indicators);
        if frames.is_empty() {
            debug!("{}: not enough candles ({})", pair, candles.len());
            return Ok(Vec::new());
        }
        Ok(detect_events(pair, timeframe, &frames, &self.thresholds, Utc::now()))
    }

    /// Scan the whole universe once
    ///
    /// Per-pair failures are logged and skipped. Each pair whose alert passes
    /// the ledger gate is notified once and gets one audit row, in
    /// enumeration order. A set shutdown flag stops the batch between pairs.
    pub async fn run_batch(&self, shutdown: Option<&watch::Receiver<bool>>) -> BatchReport {
        let mut report = BatchReport::default();
        let timeframe = self.scan.timeframe;

        let universe = match self.universe().await {
            Ok(pairs) => pairs,
            Err(e) => {
                warn!("Auto-scan skipped, pair universe unavailable: {}", e);
                return report;
            }
        };
        report.universe = universe.len();
        log_scan!("Auto-scan started: {} pairs on {}", universe.len(), timeframe);

        for pair in &universe {
            if shutdown.is_some_and(|rx| *rx.borrow()) {
                report.interrupted = true;
                warn!("Auto-scan interrupted by shutdown after {} pairs", report.scanned + report.skipped);
                break;
            }

            let events = match self.scan_pair(pair, timeframe).await {
                Ok(events) => events,
                Err(e) => {
                    warn!("Skipping {}: {}", pair, e);
                    report.skipped += 1;
                    continue;
                }
            };
            report.scanned += 1;
            if events.is_empty() {
                continue;
            }

            let signal_text = join_labels(&events);
            let Some(pending) = self.ledger.begin(pair, &signal_text) else {
                debug!("{}: '{}' already sent", pair, signal_text);
                report.duplicates += 1;
                continue;
            };
            report.alerted += 1;

            let message = format_scan_alert(pair, timeframe, &events);
            if self.notifier.send_text(&message).await {
                pending.commit(Utc::now());
                report.notified += 1;
                log_signal!("{} {}: {}", pair, timeframe, signal_text);
            } else {
                drop(pending);
                warn!("Delivery failed for {}, will retry next batch", pair);
            }

            let entry = AlertLogEntry {
                timestamp: Utc::now(),
                pair: pair.clone(),
                signals: events.iter().map(SignalEvent::detail).collect(),
            };
            if let Err(e) = self.audit.append(&entry) {
                log_error!("Failed to write audit row for {}: {}", pair, e);
            }
        }

        log_metrics!(
            "Auto-scan finished: {} scanned, {} skipped, {} alerted, {} notified, {} duplicates",
            report.scanned,
            report.skipped,
            report.alerted,
            report.notified,
            report.duplicates
        );
        report
    }

    /// On-demand scan of one pair
    pub async fn scan_selected(&self, pair: &Pair, timeframe: Timeframe) -> Result<InteractiveOutcome> {
        let summary = self.source.get_summary(pair).await?;
        let events = self.scan_pair(pair, timeframe).await?;
        if events.is_empty() {
            return Ok(InteractiveOutcome::NoSignal);
        }

        let signal_text = join_labels(&events);
        let Some(pending) = self.ledger.begin(pair, &signal_text) else {
            return Ok(InteractiveOutcome::AlreadySent { signal_text });
        };

        let mut message = format!(
            "🔔 Signal detected on {} ({})\nLast price: {}",
            pair.display_upper(),
            timeframe,
            format_price(summary.last, pair)
        );
        if let Some(pct) = summary.percent_from_low() {
            message.push_str(&format!(" ({:+.2}% from 24h low)", pct));
        }
        for event in &events {
            message.push_str("\n- ");
            message.push_str(&event.detail());
        }
        match self.source.get_trade_volume(pair).await {
            Ok(volume) => {
                match classify_with_ratio(volume.buy, volume.sell, self.thresholds.strong_ratio) {
                    Ok(classification) => message.push_str(&format!(
                        "\nPressure: {} ({}), {}",
                        classification,
                        pressure_label(volume.buy, volume.sell),
                        position_suggestion(classification)
                    )),
                    Err(e) => warn!("{}: {}", pair, e),
                }
            }
            Err(e) => debug!("Trade volume unavailable for {}: {}", pair, e),
        }

        if !self.notifier.send_text(&message).await {
            return Ok(InteractiveOutcome::DeliveryFailed { message });
        }

        let now = Utc::now();
        pending.commit(now);
        log_signal!("Interactive alert sent for {} {}", pair, timeframe);
        if let Err(e) = self.signal_log.append(now, pair, &message) {
            log_error!("Failed to append signal log: {}", e);
        }
        Ok(InteractiveOutcome::Sent { message })
    }

    /// Classify every ticker, refresh the board and compute top movers
    pub async fn market_overview(&self, top_n: usize) -> Result<MarketOverview> {
        let tickers = self.source.get_all_tickers().await?;
        let rows = build_rows(&tickers, self.thresholds.strong_ratio, &self.board, Utc::now());
        Ok(MarketOverview {
            rows,
            movers: top_movers(&tickers, top_n),
        })
    }
}
