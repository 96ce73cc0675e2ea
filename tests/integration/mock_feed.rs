//! Mock series feed for integration testing.
//!
//! Provides a deterministic `SeriesFeed` implementation that serves
//! pre-built bars from memory and records every request.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pulse::feed::SeriesFeed;
use pulse::types::{Bar, BarSeries, Timeframe};

/// A mock feed for deterministic testing.
///
/// Symbols without bars behave like instruments the broker can't serve.
pub struct MockFeed {
    bars: HashMap<String, Vec<Bar>>,
    requests: Arc<Mutex<Vec<(String, Timeframe, usize)>>>,
}

impl MockFeed {
    pub fn new() -> Self {
        Self {
            bars: HashMap::new(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }

    /// Every `(symbol, timeframe, bar_count)` requested so far.
    pub fn requests(&self) -> Vec<(String, Timeframe, usize)> {
        self.requests.lock().unwrap().clone()
    }

    /// The feed used by most cycle tests:
    /// - EURUSDm: flat, wide bars (ATR 0.0020)
    /// - GBPUSDm: steady climb of about 0.6% on narrow bars (ATR 0.0010)
    /// - AUDCADm: flat and quiet (ATR 0.0002)
    /// - USDCHFm: quiet, then a bullish reversal on 10x volume
    /// - NZDJPYm: no data
    pub fn standard() -> Self {
        Self::new()
            .with_bars("EURUSDm", flat(1.1, 0.0020, 20))
            .with_bars("GBPUSDm", climbing(1.25, 0.0005, 0.0010, 20))
            .with_bars("AUDCADm", flat(0.9, 0.0002, 20))
            .with_bars("USDCHFm", bullish_spike(20))
    }
}

#[async_trait]
impl SeriesFeed for MockFeed {
    async fn fetch(&self, symbol: &str, timeframe: Timeframe, bar_count: usize) -> Result<BarSeries> {
        self.requests
            .lock()
            .unwrap()
            .push((symbol.to_string(), timeframe, bar_count));

        let bars = self
            .bars
            .get(symbol)
            .ok_or_else(|| anyhow!("no data for {symbol}"))?;
        if bars.len() < bar_count {
            return Err(anyhow!("only {} bars for {symbol}", bars.len()));
        }
        Ok(BarSeries::new(symbol, bars[bars.len() - bar_count..].to_vec()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// Bar generators
// ---------------------------------------------------------------------------

fn bar(i: usize, open: f64, high: f64, low: f64, close: f64, tick_volume: f64) -> Bar {
    Bar {
        time: Utc.with_ymd_and_hms(2025, 4, 7, 0, 0, 0).unwrap() + Duration::minutes(30 * i as i64),
        open,
        high,
        low,
        close,
        tick_volume,
    }
}

/// Bars with constant close and the given high-low range.
pub fn flat(price: f64, range: f64, n: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| bar(i, price, price + range / 2.0, price - range / 2.0, price, 100.0))
        .collect()
}

/// Closes rising by `step` per bar; each bar spans `range` around its close.
pub fn climbing(start: f64, step: f64, range: f64, n: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let close = start + step * i as f64;
            bar(i, close - step, close + range / 2.0, close - range / 2.0, close, 100.0)
        })
        .collect()
}

/// Quiet bars around 0.9000 ending in a bullish reversal on a volume spike.
pub fn bullish_spike(n: usize) -> Vec<Bar> {
    let mut bars = flat(0.9, 0.0004, n - 1);
    bars.push(bar(n - 1, 0.8999, 0.9010, 0.8990, 0.9008, 1000.0));
    bars
}
