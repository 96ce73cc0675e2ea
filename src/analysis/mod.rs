//! Per-instrument analysis — volatility, price change, and smart-money
//! reversal detection.

pub mod metrics;
pub mod reversal;

use crate::types::{BarSeries, InstrumentMetrics, ScanError};
use reversal::DetectorParams;

/// Compute the full metrics record for one series.
///
/// Any degenerate input is reported as a `ScanError`; the caller decides
/// whether to skip the instrument.
pub fn analyse(
    series: &BarSeries,
    period: usize,
    params: &DetectorParams,
) -> Result<InstrumentMetrics, ScanError> {
    let volatility = metrics::volatility(series, period)?;
    let price_change_pct = metrics::price_change_pct(series)?;
    let signals = reversal::detect(series, period, params)?;

    Ok(InstrumentMetrics {
        volatility,
        price_change_pct,
        smart_money: signals.smart_money,
        volume_spike: signals.volume_spike,
        bullish_reversal: signals.bullish_reversal,
        bearish_reversal: signals.bearish_reversal,
    })
}
