//! File-backed replay feed.
//!
//! Serves rate rows recorded as `{dir}/{SYMBOL}_{TIMEFRAME}.json`, each file
//! holding a JSON array in the bridge's row format. Always returns the most
//! recent `bar_count` rows of the file.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{rows_to_series, RateRow, SeriesFeed};
use crate::types::{BarSeries, Timeframe};

const FEED_NAME: &str = "replay";

/// Replay feed rooted at a directory of rate files.
pub struct ReplayFeed {
    dir: PathBuf,
}

impl ReplayFeed {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the rate file for a symbol/timeframe.
    pub fn path_for(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.dir.join(format!("{symbol}_{}.json", timeframe.code()))
    }

    /// Write rows for a symbol/timeframe (used to record fixtures).
    pub fn write_rows(&self, symbol: &str, timeframe: Timeframe, rows: &[RateRow]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create replay dir {}", self.dir.display()))?;
        let path = self.path_for(symbol, timeframe);
        let json = serde_json::to_string_pretty(rows).context("Failed to serialise rate rows")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn read_rows(path: &Path) -> Result<Vec<RateRow>> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

#[async_trait]
impl SeriesFeed for ReplayFeed {
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        bar_count: usize,
    ) -> Result<BarSeries> {
        let path = self.path_for(symbol, timeframe);
        debug!(path = %path.display(), bar_count, "Replaying rates");

        let rows = Self::read_rows(&path)?;
        Ok(rows_to_series(symbol, &rows, bar_count)?)
    }

    fn name(&self) -> &str {
        FEED_NAME
    }
}
