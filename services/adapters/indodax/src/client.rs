//! REST client for the Indodax public API

use crate::candles;
use crate::config::IndodaxConfig;
use crate::error::{AdapterError, Result};
use crate::parse::{self, TradeRecord, TradeVolume};
use crate::rate_limit::RateLimiter;
use crate::source::MarketSource;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};
use types::{Pair, PricePoint, Summary, TickerSnapshot, Timeframe};

#[derive(Debug, Clone)]
pub struct IndodaxClient {
    config: IndodaxConfig,
    http: reqwest::Client,
    limiter: RateLimiter,
}

impl IndodaxClient {
    pub fn new(config: IndodaxConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        let limiter = RateLimiter::new(config.requests_per_minute);

        info!(
            "Indodax client ready: {} ({} req/min, timeout {}s)",
            config.base_url, config.requests_per_minute, config.request_timeout_secs
        );

        Ok(Self {
            config,
            http,
            limiter,
        })
    }

    pub fn config(&self) -> &IndodaxConfig {
        &self.config
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.config.endpoint(path);
        self.limiter.wait().await;

        debug!("GET {}", url);
        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AdapterError::RateLimited { url });
        }
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Raw trade records of one pair, newest first as served
    pub async fn get_trades(&self, pair: &Pair) -> Result<Vec<TradeRecord>> {
        let payload = self.get_json(&format!("{}/trades", pair.as_str())).await?;
        parse::parse_trades(&payload)
    }
}

#[async_trait]
impl MarketSource for IndodaxClient {
    async fn list_pairs(&self) -> Result<Vec<Pair>> {
        let payload = self.get_json("tickers").await?;
        parse::parse_pair_list(&payload)
    }

    async fn get_summary(&self, pair: &Pair) -> Result<Summary> {
        let payload = self.get_json(&format!("{}/ticker", pair.as_str())).await?;
        parse::parse_summary(pair, &payload, self.config.parse_policy)
    }

    async fn get_candles(&self, pair: &Pair, timeframe: Timeframe, limit: usize) -> Result<Vec<PricePoint>> {
        let trades = self.get_trades(pair).await?;
        let candles = candles::resample(&trades, timeframe, Some(limit));
        debug!(
            "{} {}: {} trades -> {} candles",
            pair,
            timeframe,
            trades.len(),
            candles.len()
        );
        Ok(candles)
    }

    async fn get_all_tickers(&self) -> Result<BTreeMap<Pair, TickerSnapshot>> {
        let payload = self.get_json("tickers").await?;
        parse::parse_tickers(&payload, self.config.parse_policy)
    }

    async fn get_trade_volume(&self, pair: &Pair) -> Result<TradeVolume> {
        let trades = self.get_trades(pair).await?;
        Ok(parse::trade_volume(&trades))
    }
}
