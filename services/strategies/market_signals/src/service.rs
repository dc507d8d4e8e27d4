//! Background service: startup message, scheduled auto-scan and snapshots

use crate::config::SignalsConfig;
use crate::scanner::Scanner;
use crate::scheduler::{run_schedule, Cadence};
use crate::snapshot::{deliver_snapshot, MarketDigest, SnapshotProvider};
use crate::{log_success, log_warning};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub const STARTUP_MESSAGE: &str = "✅ Signal scanner is up";

pub struct SignalService {
    scanner: Arc<Scanner>,
    config: SignalsConfig,
    snapshot: Option<Arc<dyn SnapshotProvider>>,
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<usize>>,
}

impl SignalService {
    /// Snapshots default to the text market digest when enabled
    pub fn new(scanner: Arc<Scanner>, config: SignalsConfig) -> Self {
        let snapshot: Option<Arc<dyn SnapshotProvider>> = config
            .snapshot
            .is_enabled()
            .then(|| Arc::new(MarketDigest::new(scanner.clone(), config.snapshot.top_n)) as Arc<dyn SnapshotProvider>);
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            scanner,
            config,
            snapshot,
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    pub fn with_snapshot_provider(mut self, provider: Arc<dyn SnapshotProvider>) -> Self {
        self.snapshot = Some(provider);
        self
    }

    pub fn scanner(&self) -> &Arc<Scanner> {
        &self.scanner
    }

    /// True while every spawned job is still running
    pub fn is_running(&self) -> bool {
        !self.handles.is_empty() && self.handles.iter().all(|h| !h.is_finished())
    }

    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Send the startup message and spawn the scheduled jobs
    pub async fn start(&mut self) {
        info!(
            "Starting signal service: auto-scan every {:?} on {}",
            self.config.scan.interval(),
            self.config.scan.timeframe
        );

        if self.config.scan.startup_message
            && !self.scanner.notifier().send_text(STARTUP_MESSAGE).await
        {
            log_warning!("Startup message could not be delivered");
        }

        let scanner = self.scanner.clone();
        let batch_shutdown = self.shutdown_tx.subscribe();
        self.handles.push(tokio::spawn(run_schedule(
            "auto-scan",
            Cadence::new(self.config.scan.interval(), self.config.scan.run_on_start),
            self.config.scan.poll(),
            self.shutdown_tx.subscribe(),
            move || {
                let scanner = scanner.clone();
                let shutdown = batch_shutdown.clone();
                async move {
                    scanner.run_batch(Some(&shutdown)).await;
                }
            },
        )));

        if let Some(provider) = self.snapshot.clone() {
            let notifier = self.scanner.notifier().clone();
            self.handles.push(tokio::spawn(run_schedule(
                "snapshot",
                Cadence::new(self.config.snapshot.interval(), false),
                self.config.scan.poll(),
                self.shutdown_tx.subscribe(),
                move || {
                    let provider = provider.clone();
                    let notifier = notifier.clone();
                    async move {
                        match provider.capture().await {
                            Ok(snapshot) => {
                                if !deliver_snapshot(notifier.as_ref(), snapshot).await {
                                    log_warning!("Snapshot delivery failed");
                                }
                            }
                            Err(e) => error!("Snapshot capture failed: {}", e),
                        }
                    }
                },
            )));
        }

        log_success!("Signal service started with {} background jobs", self.handles.len());
    }

    /// Signal shutdown and wait for in-flight runs to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Background job ended abnormally: {}", e);
            }
        }
        info!("Signal service stopped");
    }
}
