//! Series metrics — volatility (ATR) and window price change.
//!
//! Both functions are pure and fail with a typed `ScanError` on degenerate
//! input instead of producing a placeholder number.

use crate::types::{BarSeries, ScanError};

/// Average True Range over the trailing `period` bars ending at the latest bar.
///
/// Each true range needs the previous bar's close, so at least `period + 1`
/// bars are required.
pub fn volatility(series: &BarSeries, period: usize) -> Result<f64, ScanError> {
    if period == 0 {
        return Err(ScanError::InsufficientData {
            needed: 1,
            available: 0,
        });
    }
    series.require(period + 1)?;

    let bars = series.bars();
    let window = &bars[bars.len() - period - 1..];
    let total: f64 = window
        .windows(2)
        .map(|pair| pair[1].true_range(pair[0].close))
        .sum();

    Ok(total / period as f64)
}

/// Signed percentage change from the first close to the last close.
pub fn price_change_pct(series: &BarSeries) -> Result<f64, ScanError> {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(ScanError::InsufficientData {
                needed: 1,
                available: 0,
            })
        }
    };

    if first.close == 0.0 {
        return Err(ScanError::DivisionByZero(format!(
            "first close of {} is zero",
            series.symbol
        )));
    }

    Ok((last.close - first.close) / first.close * 100.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
