//! Scanner configuration
//!
//! Every section has a `Default` and is `#[serde(default)]`, so a partial
//! TOML file (or none at all) yields a runnable configuration. Environment
//! overrides use the `SIGNALS_` prefix, e.g. `SIGNALS_SCAN__INTERVAL_SECS=600`
//! or `SIGNALS_TELEGRAM__TOKEN=...`.

use crate::error::{Result, ScanError};
use indodax_adapter::IndodaxConfig;
use notifier::TelegramConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use signal_config::{expand_path, ConfigLoader, DEFAULT_ENV_PREFIX};
use std::path::{Path, PathBuf};
use std::time::Duration;
use types::{Pair, Timeframe};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalsConfig {
    /// Fallback filter when `RUST_LOG` is unset
    pub log_level: String,
    pub scan: ScanConfig,
    pub indicators: IndicatorConfig,
    pub thresholds: ThresholdConfig,
    pub snapshot: SnapshotConfig,
    pub audit: AuditConfig,
    pub indodax: IndodaxConfig,
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Full-universe scan cadence
    pub interval_secs: u64,
    /// How often the schedulers check whether a run is due
    pub poll_secs: u64,
    /// Run the first batch immediately instead of after one interval
    pub run_on_start: bool,
    pub timeframe: Timeframe,
    pub candle_limit: usize,
    /// Pair universe; empty means every pair the exchange lists
    pub pairs: Vec<String>,
    /// Timeframe of the interactive `scan` command when none is given
    pub interactive_timeframe: Timeframe,
    pub startup_message: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3_600,
            poll_secs: 30,
            run_on_start: false,
            timeframe: Timeframe::OneHour,
            candle_limit: 100,
            pairs: Vec::new(),
            interactive_timeframe: Timeframe::FiveMinutes,
            startup_message: true,
        }
    }
}

impl ScanConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_secs(self.poll_secs)
    }

    /// Configured pair universe, normalized and sorted
    pub fn pair_universe(&self) -> Result<Vec<Pair>> {
        let mut pairs = self
            .pairs
            .iter()
            .map(Pair::new)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        pairs.sort();
        pairs.dedup();
        Ok(pairs)
    }
}

/// Window sizes of the indicator computer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// SMA and Bollinger window
    pub sma_window: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_k: f64,
    /// Number of preceding points averaged into `volume_avg`
    pub volume_lookback: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_window: 50,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_k: 2.0,
            volume_lookback: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    /// Latest volume must exceed this multiple of `volume_avg`
    pub volume_spike_multiplier: f64,
    /// Dominance ratio for STRONG BUY / STRONG SELL
    pub strong_ratio: Decimal,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            volume_spike_multiplier: 2.0,
            strong_ratio: dec!(1.2),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// `0` disables the snapshot schedule
    pub interval_secs: u64,
    /// Rows per top-movers list in the digest
    pub top_n: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            interval_secs: 0,
            top_n: 5,
        }
    }
}

impl SnapshotConfig {
    pub fn is_enabled(&self) -> bool {
        self.interval_secs > 0
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// CSV log of auto-scan alerts
    pub scan_log_path: PathBuf,
    /// Plain-text log of interactive alerts
    pub signal_log_path: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            scan_log_path: PathBuf::from("auto_scan_log.csv"),
            signal_log_path: PathBuf::from("signal_logs.txt"),
        }
    }
}

impl SignalsConfig {
    /// Load from an optional TOML file with `SIGNALS_` environment overrides
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut loader = ConfigLoader::new(DEFAULT_ENV_PREFIX).list_key("scan.pairs");
        if let Some(path) = path {
            loader = loader.file(path).require_file(true);
        }

        let mut config: SignalsConfig = loader.load()?;
        config.audit.scan_log_path = expand_path(&config.audit.scan_log_path)?;
        config.audit.signal_log_path = expand_path(&config.audit.signal_log_path)?;
        if config.log_level.is_empty() {
            config.log_level = "info".to_string();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let ind = &self.indicators;
        if ind.sma_window == 0 || ind.rsi_period == 0 || ind.macd_signal == 0 || ind.volume_lookback == 0 {
            return Err(ScanError::configuration("indicator windows must be positive"));
        }
        if ind.macd_fast == 0 || ind.macd_fast >= ind.macd_slow {
            return Err(ScanError::configuration(format!(
                "macd_fast ({}) must be positive and below macd_slow ({})",
                ind.macd_fast, ind.macd_slow
            )));
        }
        if !(ind.bollinger_k.is_finite() && ind.bollinger_k > 0.0) {
            return Err(ScanError::configuration("bollinger_k must be positive"));
        }

        let th = &self.thresholds;
        if !(0.0..=100.0).contains(&th.rsi_oversold)
            || !(0.0..=100.0).contains(&th.rsi_overbought)
            || th.rsi_oversold >= th.rsi_overbought
        {
            return Err(ScanError::configuration(format!(
                "RSI thresholds must satisfy 0 <= oversold ({}) < overbought ({}) <= 100",
                th.rsi_oversold, th.rsi_overbought
            )));
        }
        if !(th.volume_spike_multiplier.is_finite() && th.volume_spike_multiplier > 0.0) {
            return Err(ScanError::configuration("volume_spike_multiplier must be positive"));
        }
        if th.strong_ratio < Decimal::ONE {
            return Err(ScanError::configuration("strong_ratio must be at least 1"));
        }

        if self.scan.interval_secs == 0 || self.scan.poll_secs == 0 {
            return Err(ScanError::configuration("scan interval and poll must be positive"));
        }
        if self.scan.candle_limit < 2 {
            return Err(ScanError::configuration("candle_limit must be at least 2"));
        }
        self.scan.pair_universe()?;

        self.indodax
            .validate()
            .map_err(|e| ScanError::configuration(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_validate() {
        let config = SignalsConfig::default();
        config.validate().unwrap();
        assert_eq!(config.scan.interval(), Duration::from_secs(3600));
        assert!(!config.snapshot.is_enabled());
        assert_eq!(config.thresholds.strong_ratio, dec!(1.2));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("signals.toml");
        fs::write(
            &path,
            r#"
log_level = "debug"

[scan]
interval_secs = 1800
timeframe = "15min"
pairs = ["ETH_IDR", "btc_idr"]

[thresholds]
rsi_overbought = 75.0
strong_ratio = "1.5"

[snapshot]
interval_secs = 600
"#,
        )
        .unwrap();

        let config = SignalsConfig::load(Some(&path)).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.scan.interval_secs, 1800);
        assert_eq!(config.scan.timeframe, Timeframe::FifteenMinutes);
        assert_eq!(config.thresholds.rsi_overbought, 75.0);
        assert_eq!(config.thresholds.rsi_oversold, 30.0);
        assert_eq!(config.thresholds.strong_ratio, dec!(1.5));
        assert!(config.snapshot.is_enabled());

        let universe = config.scan.pair_universe().unwrap();
        let names: Vec<&str> = universe.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["btc_idr", "eth_idr"]);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempdir().unwrap();
        assert!(SignalsConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_rsi() {
        let mut config = SignalsConfig::default();
        config.thresholds.rsi_oversold = 80.0;
        assert!(matches!(config.validate(), Err(ScanError::Configuration { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_macd_windows() {
        let mut config = SignalsConfig::default();
        config.indicators.macd_fast = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_pair() {
        let mut config = SignalsConfig::default();
        config.scan.pairs = vec!["btc/idr".to_string()];
        assert!(matches!(config.validate(), Err(ScanError::Identifier(_))));
    }
}
