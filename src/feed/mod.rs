//! Bar-series feeds.
//!
//! Defines the `SeriesFeed` trait and provides implementations for:
//! - Bridge — HTTP client for a MetaTrader-style REST rates bridge
//! - Replay — JSON rate files on disk, for offline runs and tests

pub mod bridge;
pub mod replay;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Bar, BarSeries, ScanError, Timeframe};

/// Abstraction over bar-series sources.
///
/// Implementors return exactly the most recent `bar_count` bars, ordered
/// oldest → newest, or an error when the data cannot be obtained. A
/// partial series is never returned.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeriesFeed: Send + Sync {
    /// Fetch the latest `bar_count` bars for `symbol` on `timeframe`.
    async fn fetch(&self, symbol: &str, timeframe: Timeframe, bar_count: usize)
        -> Result<BarSeries>;

    /// Feed name for logging and identification.
    fn name(&self) -> &str;
}

/// One rate row as produced by MetaTrader's `copy_rates_*` family.
///
/// Both feeds share this wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateRow {
    /// Bar open time, unix seconds.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub tick_volume: f64,
    #[serde(default)]
    pub spread: Option<i64>,
    #[serde(default)]
    pub real_volume: Option<f64>,
}

impl RateRow {
    fn to_bar(&self) -> Option<Bar> {
        let time: DateTime<Utc> = DateTime::from_timestamp(self.time, 0)?;
        Some(Bar {
            time,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            tick_volume: self.tick_volume,
        })
    }
}

/// Turn raw rows into the latest `bar_count` bars.
///
/// Rows may arrive in any order. Too few rows, or any row with an
/// unrepresentable timestamp, makes the whole series unavailable.
pub fn rows_to_series(
    symbol: &str,
    rows: &[RateRow],
    bar_count: usize,
) -> Result<BarSeries, ScanError> {
    let mut bars = Vec::with_capacity(rows.len());
    for row in rows {
        let bar = row.to_bar().ok_or_else(|| ScanError::Unavailable {
            symbol: symbol.to_string(),
            reason: format!("invalid bar timestamp {}", row.time),
        })?;
        bars.push(bar);
    }

    if bars.len() < bar_count {
        return Err(ScanError::Unavailable {
            symbol: symbol.to_string(),
            reason: format!("requested {bar_count} bars, received {}", bars.len()),
        });
    }

    bars.sort_by_key(|b| b.time);
    let latest = bars.split_off(bars.len() - bar_count);
    Ok(BarSeries::new(symbol, latest))
}
