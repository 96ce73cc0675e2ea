//! Shared types for the PULSE scanner.
//!
//! These types form the data model used across all modules.
//! Everything here is a cycle-local value: produced during one evaluation
//! pass, consumed by the selector and notifier, then dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

/// One OHLCV sample for a fixed timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub tick_volume: f64,
}

impl Bar {
    /// True range against the previous bar's close.
    pub fn true_range(&self, prev_close: f64) -> f64 {
        (self.high - self.low)
            .max((self.high - prev_close).abs())
            .max((self.low - prev_close).abs())
    }
}

/// Bars for one instrument, ordered oldest → newest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series, sorting bars by time so the newest bar is last.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.time);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Fail with `InsufficientData` unless at least `needed` bars are present.
    pub fn require(&self, needed: usize) -> Result<(), ScanError> {
        if self.bars.len() < needed {
            return Err(ScanError::InsufficientData {
                needed,
                available: self.bars.len(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Timeframes and resolutions
// ---------------------------------------------------------------------------

/// Bar timeframe, using MetaTrader-style codes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    H2,
    H4,
    D1,
}

impl Timeframe {
    pub const ALL: &'static [Timeframe] = &[
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H2,
        Timeframe::H4,
        Timeframe::D1,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Timeframe::M1 => "M1",
            Timeframe::M5 => "M5",
            Timeframe::M15 => "M15",
            Timeframe::M30 => "M30",
            Timeframe::H1 => "H1",
            Timeframe::H2 => "H2",
            Timeframe::H4 => "H4",
            Timeframe::D1 => "D1",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Case-insensitive parse of a timeframe code.
impl std::str::FromStr for Timeframe {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Timeframe::ALL
            .iter()
            .copied()
            .find(|tf| tf.code() == upper)
            .ok_or_else(|| ScanError::Config(format!("unknown timeframe: {s}")))
    }
}

/// One evaluation resolution: a timeframe plus the lookback window length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Display name, e.g. "30min".
    pub name: String,
    pub timeframe: Timeframe,
    /// Rolling window used for ATR and the volume average.
    pub lookback: usize,
}

impl Resolution {
    /// Bars to request per instrument: the window, one prior close for the
    /// first true range, and one prior bar for the reversal comparison.
    pub fn bars_required(&self) -> usize {
        self.lookback.saturating_add(2)
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Activity thresholds shared by the selector and the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum ATR for an instrument to count as active.
    pub volatility_threshold: f64,
    /// Minimum absolute percentage move for an instrument to count as active.
    pub price_change_threshold: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            volatility_threshold: 0.0006,
            price_change_threshold: 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Currency decomposition
// ---------------------------------------------------------------------------

/// Base and quote currency of a forex symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: String,
    pub quote: String,
}

impl CurrencyPair {
    /// Decompose a symbol such as `EURUSD` or `EURUSDm`.
    ///
    /// One trailing lowercase ASCII letter is treated as a broker micro-lot
    /// marker and stripped. What remains must be exactly six uppercase ASCII
    /// letters: the first three are the base, the last three the quote.
    pub fn parse(symbol: &str) -> Result<Self, ScanError> {
        let core = match symbol.chars().last() {
            Some(c) if c.is_ascii_lowercase() => &symbol[..symbol.len() - 1],
            _ => symbol,
        };

        if core.len() != 6 || !core.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ScanError::InvalidSymbol(symbol.to_string()));
        }

        Ok(Self {
            base: core[..3].to_string(),
            quote: core[3..].to_string(),
        })
    }

    /// Whether the two pairs have any currency in common.
    pub fn overlaps(&self, other: &CurrencyPair) -> bool {
        self.base == other.base
            || self.base == other.quote
            || self.quote == other.base
            || self.quote == other.quote
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

// ---------------------------------------------------------------------------
// Per-instrument metrics
// ---------------------------------------------------------------------------

/// Everything computed for one instrument in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstrumentMetrics {
    /// Average true range over the lookback window.
    pub volatility: f64,
    /// Signed percentage change from first to last close.
    pub price_change_pct: f64,
    pub smart_money: bool,
    pub volume_spike: bool,
    pub bullish_reversal: bool,
    pub bearish_reversal: bool,
}

impl InstrumentMetrics {
    /// Whether the instrument clears at least one threshold (inclusive).
    pub fn passes(&self, thresholds: &Thresholds) -> bool {
        self.volatility >= thresholds.volatility_threshold
            || self.price_change_pct.abs() >= thresholds.price_change_threshold
    }

    /// Whether the instrument strictly exceeds at least one threshold.
    pub fn exceeds(&self, thresholds: &Thresholds) -> bool {
        self.volatility > thresholds.volatility_threshold
            || self.price_change_pct.abs() > thresholds.price_change_threshold
    }
}

impl fmt::Display for InstrumentMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ATR={:.5}, Price Change={:.2}%",
            self.volatility, self.price_change_pct
        )?;
        if self.smart_money {
            write!(f, " (Smart Money)")?;
        }
        Ok(())
    }
}

/// Insertion-ordered map from symbol to metrics.
///
/// Iteration order is the order symbols were first inserted, so every
/// sort that falls back on ties is reproducible between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsMap {
    entries: Vec<(String, InstrumentMetrics)>,
}

impl MetricsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced symbol keeps its original position.
    pub fn insert(&mut self, symbol: impl Into<String>, metrics: InstrumentMetrics) {
        let symbol = symbol.into();
        match self.entries.iter_mut().find(|(s, _)| *s == symbol) {
            Some(entry) => entry.1 = metrics,
            None => self.entries.push((symbol, metrics)),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&InstrumentMetrics> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, m)| m)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InstrumentMetrics)> {
        self.entries.iter().map(|(s, m)| (s.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, InstrumentMetrics)> for MetricsMap {
    fn from_iter<I: IntoIterator<Item = (S, InstrumentMetrics)>>(iter: I) -> Self {
        let mut map = MetricsMap::new();
        for (symbol, metrics) in iter {
            map.insert(symbol, metrics);
        }
        map
    }
}

// ---------------------------------------------------------------------------
// Currency exposure
// ---------------------------------------------------------------------------

/// Aggregated volatility for one currency across every pair it appears in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrencyExposure {
    pub aggregate_volatility: f64,
    pub sample_count: u32,
}

impl CurrencyExposure {
    pub fn add(&mut self, volatility: f64) {
        self.aggregate_volatility += volatility;
        self.sample_count += 1;
    }

    pub fn average_volatility(&self) -> f64 {
        if self.sample_count == 0 {
            0.0
        } else {
            self.aggregate_volatility / self.sample_count as f64
        }
    }
}

/// A currency with its exposure, as returned by the ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCurrency {
    pub currency: String,
    pub exposure: CurrencyExposure,
    pub average_volatility: f64,
}

impl fmt::Display for RankedCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: Avg ATR={:.5}", self.currency, self.average_volatility)
    }
}

// ---------------------------------------------------------------------------
// Scored candidates
// ---------------------------------------------------------------------------

/// An instrument that passed the filter, with its composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub symbol: String,
    pub composite_score: f64,
    pub volatility: f64,
    pub price_change_pct: f64,
    pub smart_money: bool,
}

impl fmt::Display for ScoredCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Score={:.3}, ATR={:.5}, Price Change={:.2}%",
            self.symbol, self.composite_score, self.volatility, self.price_change_pct
        )?;
        if self.smart_money {
            write!(f, " (Smart Money)")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for PULSE.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    #[error("Insufficient data: need {needed} bars, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Series unavailable for {symbol}: {reason}")]
    Unavailable { symbol: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
