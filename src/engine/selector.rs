//! Pair selection.
//!
//! Scores every instrument that clears a threshold, then greedily picks a
//! short list in which no two picks share a base or quote currency.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{CurrencyPair, MetricsMap, ScoredCandidate, Thresholds};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const VOLATILITY_WEIGHT: f64 = 0.5;
const PRICE_CHANGE_WEIGHT: f64 = 0.3;
const SMART_MONEY_BONUS: f64 = 0.2;

/// Selection settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_max_picks")]
    pub max_picks: usize,
}

fn default_max_picks() -> usize {
    3
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_picks: default_max_picks(),
        }
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Min-max bounds of a set of values. A zero range is treated as 1.
struct Bounds {
    min: f64,
    range: f64,
}

impl Bounds {
    fn of(values: impl Iterator<Item = f64>) -> Option<Self> {
        let (min, max) = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
        let range = if max > min { max - min } else { 1.0 };
        Some(Self { min, range })
    }

    fn normalise(&self, v: f64) -> f64 {
        (v - self.min) / self.range
    }
}

/// Score every instrument that passes the threshold filter, best first.
///
/// Symbols that cannot be split into base and quote are left out before
/// normalisation.
///
/// Sorted by composite score, then raw volatility, both descending.
pub fn score(metrics: &MetricsMap, thresholds: &Thresholds) -> Vec<ScoredCandidate> {
    let passing: Vec<_> = metrics
        .iter()
        .filter(|(_, m)| m.passes(thresholds))
        .filter(|(symbol, _)| match CurrencyPair::parse(symbol) {
            Ok(_) => true,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Cannot check exposure, not scored");
                false
            }
        })
        .collect();

    let vol_bounds = Bounds::of(passing.iter().map(|(_, m)| m.volatility));
    let pc_bounds = Bounds::of(passing.iter().map(|(_, m)| m.price_change_pct.abs()));
    let (vol_bounds, pc_bounds) = match (vol_bounds, pc_bounds) {
        (Some(v), Some(p)) => (v, p),
        _ => return Vec::new(),
    };

    let mut scored: Vec<ScoredCandidate> = passing
        .into_iter()
        .map(|(symbol, m)| {
            let mut composite = VOLATILITY_WEIGHT * vol_bounds.normalise(m.volatility)
                + PRICE_CHANGE_WEIGHT * pc_bounds.normalise(m.price_change_pct.abs());
            if m.smart_money {
                composite += SMART_MONEY_BONUS;
            }
            ScoredCandidate {
                symbol: symbol.to_string(),
                composite_score: composite,
                volatility: m.volatility,
                price_change_pct: m.price_change_pct,
                smart_money: m.smart_money,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.composite_score
            .total_cmp(&a.composite_score)
            .then(b.volatility.total_cmp(&a.volatility))
    });

    scored
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Pick up to `max_picks` candidates with disjoint currency exposure.
///
/// Greedy: walks the scored list once and never revisits a skipped
/// candidate, so the result is not guaranteed to be the best possible set.
pub fn select(
    metrics: &MetricsMap,
    thresholds: &Thresholds,
    max_picks: usize,
) -> Vec<ScoredCandidate> {
    let mut picked: Vec<ScoredCandidate> = Vec::new();
    let mut exposure: Vec<CurrencyPair> = Vec::new();

    for candidate in score(metrics, thresholds) {
        if picked.len() >= max_picks {
            break;
        }

        // Scored candidates always decompose.
        let Ok(pair) = CurrencyPair::parse(&candidate.symbol) else {
            continue;
        };

        if let Some(clash) = exposure.iter().find(|p| p.overlaps(&pair)) {
            debug!(
                symbol = %candidate.symbol,
                clashes_with = %clash,
                "Skipped for shared currency exposure"
            );
            continue;
        }

        exposure.push(pair);
        picked.push(candidate);
    }

    picked
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
