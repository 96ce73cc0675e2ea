//! Volatility aggregator.
//!
//! Fetches one series per instrument, analyses it, and rolls the results up
//! into a per-instrument metrics map plus per-currency average volatility.
//! A failed fetch or degenerate series skips that instrument for this cycle
//! only; the rest of the universe is still evaluated.

use tracing::{debug, info, warn};

use crate::analysis::{self, reversal::DetectorParams};
use crate::feed::SeriesFeed;
use crate::types::{
    CurrencyExposure, CurrencyPair, MetricsMap, RankedCurrency, Resolution,
};

/// Output of one ranking pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    /// Currencies sorted by average volatility, highest first.
    pub currencies: Vec<RankedCurrency>,
    pub metrics: MetricsMap,
    /// Instruments that were skipped, with the reason.
    pub skipped: Vec<(String, String)>,
}

/// Evaluate every instrument on one resolution.
///
/// Instruments are fetched one at a time in the given order.
pub async fn rank(
    instruments: &[String],
    resolution: &Resolution,
    feed: &dyn SeriesFeed,
    params: &DetectorParams,
) -> Ranking {
    let bar_count = resolution.bars_required();
    let mut metrics = MetricsMap::new();
    let mut skipped = Vec::new();

    for symbol in instruments {
        let pair = match CurrencyPair::parse(symbol) {
            Ok(pair) => pair,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Skipping instrument");
                skipped.push((symbol.clone(), e.to_string()));
                continue;
            }
        };

        let series = match feed.fetch(symbol, resolution.timeframe, bar_count).await {
            Ok(series) => series,
            Err(e) => {
                warn!(
                    symbol = %symbol,
                    feed = feed.name(),
                    error = %e,
                    "Failed to fetch data, skipping"
                );
                skipped.push((symbol.clone(), e.to_string()));
                continue;
            }
        };

        match analysis::analyse(&series, resolution.lookback, params) {
            Ok(m) => {
                debug!(symbol = %symbol, pair = %pair, metrics = %m, "Instrument analysed");
                metrics.insert(symbol.clone(), m);
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Degenerate series, skipping");
                skipped.push((symbol.clone(), e.to_string()));
            }
        }
    }

    let currencies = rank_currencies(&metrics);

    info!(
        resolution = %resolution.name,
        evaluated = metrics.len(),
        skipped = skipped.len(),
        currencies = currencies.len(),
        "Ranking complete"
    );

    Ranking {
        currencies,
        metrics,
        skipped,
    }
}

/// Fold instrument volatility into base and quote currency exposure.
///
/// Sorted by average volatility descending; ties keep first-seen order.
/// Symbols that cannot be decomposed are ignored.
pub fn rank_currencies(metrics: &MetricsMap) -> Vec<RankedCurrency> {
    let mut exposures: Vec<(String, CurrencyExposure)> = Vec::new();

    for (symbol, m) in metrics.iter() {
        let pair = match CurrencyPair::parse(symbol) {
            Ok(pair) => pair,
            Err(_) => continue,
        };
        for currency in [pair.base, pair.quote] {
            match exposures.iter_mut().find(|(c, _)| *c == currency) {
                Some((_, exposure)) => exposure.add(m.volatility),
                None => {
                    let mut exposure = CurrencyExposure::default();
                    exposure.add(m.volatility);
                    exposures.push((currency, exposure));
                }
            }
        }
    }

    let mut ranked: Vec<RankedCurrency> = exposures
        .into_iter()
        .map(|(currency, exposure)| RankedCurrency {
            currency,
            average_volatility: exposure.average_volatility(),
            exposure,
        })
        .collect();

    // Stable sort: equal averages stay in first-seen order.
    ranked.sort_by(|a, b| b.average_volatility.total_cmp(&a.average_volatility));

    ranked
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
