//! Notification engine.
//!
//! Turns a cycle's metrics map into alert messages: the most active
//! instruments by volatility, every smart-money reversal, and a shortfall
//! note when fewer than three active instruments were found.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{MetricsMap, Thresholds};

/// Activity alerts aim for at least this many entries.
const MIN_ACTIVITY_ALERTS: usize = 3;

/// Reversal direction named in a smart-money alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReversalKind {
    Bullish,
    Bearish,
}

impl fmt::Display for ReversalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReversalKind::Bullish => write!(f, "Bullish"),
            ReversalKind::Bearish => write!(f, "Bearish"),
        }
    }
}

/// One alert produced by a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alert {
    HighActivity {
        symbol: String,
        volatility: f64,
        price_change_pct: f64,
    },
    SmartMoney {
        symbol: String,
        reversal: ReversalKind,
    },
    Shortfall {
        found: usize,
    },
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::HighActivity {
                symbol,
                volatility,
                price_change_pct,
            } => write!(
                f,
                "High activity detected in {symbol}: ATR={volatility:.5}, Price Change={price_change_pct:.2}%"
            ),
            Alert::SmartMoney { symbol, reversal } => write!(
                f,
                "Smart money activity detected in {symbol}: {reversal} reversal with volume spike"
            ),
            Alert::Shortfall { found } => {
                write!(f, "Note: Only {found} high activity pair(s) detected")
            }
        }
    }
}

/// Build the ordered alert list for one cycle.
///
/// Order: activity alerts (volatility descending), then smart-money alerts
/// in map order, then the shortfall note if any.
pub fn build_alerts(metrics: &MetricsMap, thresholds: &Thresholds) -> Vec<Alert> {
    let mut active: Vec<(&str, f64, f64)> = metrics
        .iter()
        .filter(|(_, m)| m.exceeds(thresholds))
        .map(|(s, m)| (s, m.volatility, m.price_change_pct))
        .collect();

    // Stable: equal volatility keeps map order.
    active.sort_by(|a, b| b.1.total_cmp(&a.1));

    // Everything at or above the cutoff volatility is included, so a tie at
    // the third place can yield more than three alerts.
    let selected = match active.get(MIN_ACTIVITY_ALERTS - 1) {
        Some(&(_, cutoff, _)) => active
            .iter()
            .enumerate()
            .take_while(|(i, (_, vol, _))| *i < MIN_ACTIVITY_ALERTS || *vol >= cutoff)
            .count(),
        None => active.len(),
    };

    let mut alerts: Vec<Alert> = active[..selected]
        .iter()
        .map(|&(symbol, volatility, price_change_pct)| Alert::HighActivity {
            symbol: symbol.to_string(),
            volatility,
            price_change_pct,
        })
        .collect();

    for (symbol, m) in metrics.iter().filter(|(_, m)| m.smart_money) {
        // Both flags can be set on pathological bars; bullish wins.
        let reversal = if m.bullish_reversal {
            ReversalKind::Bullish
        } else {
            ReversalKind::Bearish
        };
        alerts.push(Alert::SmartMoney {
            symbol: symbol.to_string(),
            reversal,
        });
    }

    if selected < MIN_ACTIVITY_ALERTS {
        alerts.push(Alert::Shortfall { found: selected });
    }

    alerts
}

/// Alert messages as plain text.
pub fn notify(metrics: &MetricsMap, thresholds: &Thresholds) -> Vec<String> {
    build_alerts(metrics, thresholds)
        .iter()
        .map(Alert::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
