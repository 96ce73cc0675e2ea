//! Smart-money detection.
//!
//! Flags volume-spike-confirmed reversals on the latest bar. "Smart money"
//! is a volume spike coinciding with a same-bar bullish or bearish
//! reversal against the previous bar's range.

use serde::{Deserialize, Serialize};

use crate::types::{BarSeries, ScanError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunable detector parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorParams {
    /// Latest volume must exceed this multiple of the rolling mean.
    #[serde(default = "default_volume_multiplier")]
    pub volume_multiplier: f64,
    /// Price tolerance when comparing the close to the previous bar's range.
    #[serde(default = "default_reversal_epsilon")]
    pub reversal_epsilon: f64,
}

fn default_volume_multiplier() -> f64 {
    1.5
}

fn default_reversal_epsilon() -> f64 {
    0.0003
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            volume_multiplier: default_volume_multiplier(),
            reversal_epsilon: default_reversal_epsilon(),
        }
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Output of the detector for one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReversalSignals {
    pub smart_money: bool,
    pub volume_spike: bool,
    pub bullish_reversal: bool,
    /// May be true together with `bullish_reversal` on pathological bars.
    pub bearish_reversal: bool,
}

/// Run the detector over the most recent bars of `series`.
///
/// Needs `period + 2` bars: the rolling volume window plus the last two bars.
pub fn detect(
    series: &BarSeries,
    period: usize,
    params: &DetectorParams,
) -> Result<ReversalSignals, ScanError> {
    if period == 0 {
        return Err(ScanError::InsufficientData {
            needed: 2,
            available: 0,
        });
    }
    series.require(period + 2)?;

    let bars = series.bars();
    let n = bars.len();
    let current = &bars[n - 1];
    let prev = &bars[n - 2];

    let avg_volume =
        bars[n - period..].iter().map(|b| b.tick_volume).sum::<f64>() / period as f64;
    let volume_spike = current.tick_volume > avg_volume * params.volume_multiplier;

    let eps = params.reversal_epsilon;
    let bullish_reversal = current.low <= prev.low
        && current.close >= prev.high - eps
        && current.close > current.open;
    let bearish_reversal = current.high >= prev.high
        && current.close <= prev.low + eps
        && current.close < current.open;

    Ok(ReversalSignals {
        smart_money: volume_spike && (bullish_reversal || bearish_reversal),
        volume_spike,
        bullish_reversal,
        bearish_reversal,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
