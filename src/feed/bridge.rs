//! MetaTrader REST bridge client.
//!
//! Talks to a small HTTP service sitting next to the trading terminal and
//! exposing its rate history.
//!
//! Endpoint: `GET {base_url}/rates?symbol=EURUSDm&timeframe=M30&count=16`
//! Response: JSON array of rate rows (`time`, `open`, `high`, `low`,
//! `close`, `tick_volume`, optional `spread` / `real_volume`).
//! Auth: optional `Authorization: Bearer {token}`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::debug;

use super::{rows_to_series, RateRow, SeriesFeed};
use crate::types::{BarSeries, Timeframe};

const FEED_NAME: &str = "bridge";

/// Default request timeout when the config doesn't set one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP rates-bridge feed.
pub struct BridgeFeed {
    http: Client,
    base_url: String,
    token: Option<SecretString>,
}

impl BridgeFeed {
    /// Create a new bridge client.
    ///
    /// `token` is optional — only needed when the bridge enforces auth.
    pub fn new(base_url: &str, token: Option<SecretString>, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("PULSE/0.1.0 (fx-scanner)")
            .build()
            .context("Failed to build HTTP client for rates bridge")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn rates_url(&self) -> String {
        format!("{}/rates", self.base_url)
    }
}

#[async_trait]
impl SeriesFeed for BridgeFeed {
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        bar_count: usize,
    ) -> Result<BarSeries> {
        let url = self.rates_url();
        debug!(url = %url, symbol, timeframe = %timeframe, bar_count, "Fetching rates");

        let mut req = self.http.get(&url).query(&[
            ("symbol", symbol.to_string()),
            ("timeframe", timeframe.code().to_string()),
            ("count", bar_count.to_string()),
        ]);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token.expose_secret());
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("Rates bridge request failed for {symbol}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Rates bridge error {status} for {symbol}: {body}");
        }

        let rows: Vec<RateRow> = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse rates for {symbol}"))?;

        Ok(rows_to_series(symbol, &rows, bar_count)?)
    }

    fn name(&self) -> &str {
        FEED_NAME
    }
}
