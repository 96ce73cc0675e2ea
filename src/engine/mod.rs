//! Core engine — rank → select → notify for one resolution.

pub mod aggregator;
pub mod notifier;
pub mod report;
pub mod selector;

use chrono::Utc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::feed::SeriesFeed;
use crate::types::Resolution;
use report::CycleReport;

/// Run one evaluation of every configured instrument on `resolution`.
///
/// Never fails: instruments that cannot be evaluated are listed in
/// `CycleReport::skipped`, and an empty universe still yields a report.
pub async fn run_cycle(
    feed: &dyn SeriesFeed,
    cfg: &AppConfig,
    resolution: &Resolution,
) -> CycleReport {
    let cycle_id = Uuid::new_v4();
    let span = cycle_span(cycle_id, &resolution.name);
    span.in_scope(|| {
        info!(
            timeframe = %resolution.timeframe,
            instruments = cfg.instruments.len(),
            "Monitoring {} timeframe...",
            resolution.name
        )
    });

    let ranking = aggregator::rank(&cfg.instruments, resolution, feed, &cfg.detector)
        .instrument(span.clone())
        .await;
    let (shortlist, alerts) = span.in_scope(|| {
        (
            selector::select(&ranking.metrics, &cfg.thresholds, cfg.selection.max_picks),
            notifier::build_alerts(&ranking.metrics, &cfg.thresholds),
        )
    });

    CycleReport {
        cycle_id,
        resolution: resolution.name.clone(),
        timestamp: Utc::now(),
        currencies: ranking.currencies,
        shortlist,
        alerts,
        metrics: ranking.metrics,
        skipped: ranking
            .skipped
            .into_iter()
            .map(|(symbol, reason)| format!("{symbol}: {reason}"))
            .collect(),
    }
}

/// Span carried by every log line of one cycle.
pub(crate) fn cycle_span(cycle_id: Uuid, resolution: &str) -> tracing::Span {
    info_span!("cycle", cycle_id = %cycle_id, resolution = %resolution)
}
