//! Periodic market snapshot notifications

use crate::error::{Result, ScanError};
use crate::overview::{format_idr, format_price};
use crate::scanner::{MarketOverview, Scanner};
use async_trait::async_trait;
use chrono::Utc;
use notifier::Notifier;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use types::Classification;

/// What a snapshot provider produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    Text(String),
    /// Rendered image; the file is removed after delivery
    Image { path: PathBuf, caption: String },
}

#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn capture(&self) -> Result<Snapshot>;
}

/// Text digest: classification counts and top movers
pub struct MarketDigest {
    scanner: Arc<Scanner>,
    top_n: usize,
}

impl MarketDigest {
    pub fn new(scanner: Arc<Scanner>, top_n: usize) -> Self {
        Self { scanner, top_n }
    }
}

#[async_trait]
impl SnapshotProvider for MarketDigest {
    async fn capture(&self) -> Result<Snapshot> {
        let overview = self.scanner.market_overview(self.top_n).await?;
        if overview.rows.is_empty() {
            return Err(ScanError::Snapshot {
                message: "no tickers available".to_string(),
            });
        }
        let counts = self.scanner.board().counts();
        Ok(Snapshot::Text(render_digest(&overview, &counts)))
    }
}

/// Render the digest body
pub fn render_digest(overview: &MarketOverview, counts: &[(Classification, usize)]) -> String {
    let mut out = format!("📊 Market snapshot {}\n", Utc::now().format("%Y-%m-%d %H:%M UTC"));

    let tally: Vec<String> = counts.iter().map(|(c, n)| format!("{}: {}", c, n)).collect();
    let _ = writeln!(out, "{}", tally.join(" | "));

    if !overview.movers.gainers.is_empty() {
        out.push_str("\n🚀 Top gainers\n");
        for (i, (pair, t)) in overview.movers.gainers.iter().enumerate() {
            let change = t.change.unwrap_or_default();
            let _ = writeln!(out, "{}. {} {:+.2}% @ {}", i + 1, pair.display_upper(), change, format_price(t.last, pair));
        }
    }
    if !overview.movers.losers.is_empty() {
        out.push_str("\n📉 Top losers\n");
        for (i, (pair, t)) in overview.movers.losers.iter().enumerate() {
            let change = t.change.unwrap_or_default();
            let _ = writeln!(out, "{}. {} {:+.2}% @ {}", i + 1, pair.display_upper(), change, format_price(t.last, pair));
        }
    }
    if !overview.movers.volume.is_empty() {
        out.push_str("\n💰 Top volume\n");
        for (i, (pair, t)) in overview.movers.volume.iter().enumerate() {
            let _ = writeln!(out, "{}. {} {} IDR", i + 1, pair.display_upper(), format_idr(t.vol_idr));
        }
    }
    out.trim_end().to_string()
}

/// Deliver a snapshot; image files are deleted whether or not delivery succeeded
pub async fn deliver_snapshot(notifier: &dyn Notifier, snapshot: Snapshot) -> bool {
    match snapshot {
        Snapshot::Text(text) => notifier.send_text(&text).await,
        Snapshot::Image { path, caption } => {
            let delivered = notifier.send_image(&path, &caption).await;
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!("Failed to remove snapshot {:?}: {}", path, e);
            }
            delivered
        }
    }
}
