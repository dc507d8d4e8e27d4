//! Append-only alert logs
//!
//! The auto-scan CSV log (`Timestamp,Pair,Detected Signals`) records every
//! alert that passed the ledger gate. The text signal log records alerts sent
//! from the interactive scan.

use crate::error::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use types::{AlertLogEntry, Pair};

pub const CSV_HEADER: [&str; 3] = ["Timestamp", "Pair", "Detected Signals"];
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only sink for auto-scan alert rows
pub trait AuditSink: Send + Sync {
    fn append(&self, entry: &AlertLogEntry) -> Result<()>;
}

fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

#[derive(Debug)]
pub struct CsvAuditLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row back, oldest first
    pub fn read_all(&self) -> Result<Vec<AlertLogEntry>> {
        let _guard = self.lock.lock();
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record?;
            let (Some(ts), Some(pair), Some(signals)) = (record.get(0), record.get(1), record.get(2)) else {
                continue;
            };
            let Ok(naive) = NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT) else {
                continue;
            };
            entries.push(AlertLogEntry {
                timestamp: naive.and_utc(),
                pair: Pair::new(pair)?,
                signals: signals.split(", ").map(str::to_string).collect(),
            });
        }
        Ok(entries)
    }
}

impl AuditSink for CsvAuditLog {
    fn append(&self, entry: &AlertLogEntry) -> Result<()> {
        let _guard = self.lock.lock();
        let file = open_append(&self.path)?;
        let write_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if write_header {
            writer.write_record(CSV_HEADER)?;
        }
        writer.write_record([
            entry.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            entry.pair.display_upper(),
            entry.signals_csv(),
        ])?;
        writer.flush()?;
        Ok(())
    }
}

/// Plain-text log of interactive alerts: `{time} - {PAIR} - {message}`
#[derive(Debug)]
pub struct SignalLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SignalLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn append(&self, at: DateTime<Utc>, pair: &Pair, message: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut file = open_append(&self.path)?;
        writeln!(
            file,
            "{} - {} - {}",
            at.format(TIMESTAMP_FORMAT),
            pair.display_upper(),
            message
        )?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(pair: &str, signals: &[&str]) -> AlertLogEntry {
        AlertLogEntry {
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            pair: Pair::new(pair).unwrap(),
            signals: signals.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs/auto_scan_log.csv");
        let log = CsvAuditLog::new(&path);

        log.append(&entry("btc_idr", &["RSI Overbought (72.00)", "Volume Spike (3.00x avg)"]))
            .unwrap();
        log.append(&entry("eth_idr", &["MACD Bullish Crossover"])).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Timestamp,Pair,Detected Signals");
        assert_eq!(
            lines[1],
            "2023-11-14 22:13:20,BTC_IDR,\"RSI Overbought (72.00), Volume Spike (3.00x avg)\""
        );
        assert_eq!(lines[2], "2023-11-14 22:13:20,ETH_IDR,MACD Bullish Crossover");
    }

    #[test]
    fn test_reopen_does_not_repeat_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auto_scan_log.csv");

        CsvAuditLog::new(&path).append(&entry("btc_idr", &["RSI Oversold"])).unwrap();
        CsvAuditLog::new(&path).append(&entry("btc_idr", &["RSI Oversold"])).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("Timestamp,Pair").count(), 1);

        let entries = CsvAuditLog::new(&path).read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].pair.as_str(), "btc_idr");
        assert_eq!(entries[0].signals, vec!["RSI Oversold"]);
    }

    #[test]
    fn test_concurrent_appends_are_serialized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auto_scan_log.csv");
        let log = std::sync::Arc::new(CsvAuditLog::new(&path));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = log.clone();
                std::thread::spawn(move || {
                    let pair = format!("pair{}_idr", t);
                    for _ in 0..50 {
                        log.append(&entry(&pair, &["RSI Oversold (25.00)", "Volume Spike (2.50x avg)"]))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("Timestamp,Pair,Detected Signals").count(), 1);

        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 400);
        assert!(entries
            .iter()
            .all(|e| e.signals == vec!["RSI Oversold (25.00)", "Volume Spike (2.50x avg)"]));
        for t in 0..8 {
            let pair = format!("pair{}_idr", t);
            assert_eq!(entries.iter().filter(|e| e.pair.as_str() == pair).count(), 50);
        }
    }

    #[test]
    fn test_signal_log_line_format() {
        let dir = tempdir().unwrap();
        let log = SignalLog::new(dir.path().join("signal_logs.txt"));
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        log.append(at, &Pair::new("btc_idr").unwrap(), "Volume Spike").unwrap();

        let contents = fs::read_to_string(log.path()).unwrap();
        assert_eq!(contents, "2023-11-14 22:13:20 - BTC_IDR - Volume Spike\n");
    }
}
