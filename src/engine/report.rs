//! Cycle report — the result of evaluating one resolution, plus the
//! human-readable log summary.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::notifier::Alert;
use crate::types::{InstrumentMetrics, MetricsMap, RankedCurrency, ScoredCandidate};

/// Currencies shown in the summary.
pub const TOP_CURRENCIES: usize = 3;

/// Instruments shown in the "active pairs" section.
pub const MOST_ACTIVE: usize = 5;

/// Everything produced by one evaluation of one resolution.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub resolution: String,
    pub timestamp: DateTime<Utc>,
    pub currencies: Vec<RankedCurrency>,
    pub shortlist: Vec<ScoredCandidate>,
    pub alerts: Vec<Alert>,
    pub metrics: MetricsMap,
    pub skipped: Vec<String>,
}

impl CycleReport {
    /// The `n` currencies with the highest average volatility.
    pub fn top_currencies(&self, n: usize) -> &[RankedCurrency] {
        &self.currencies[..n.min(self.currencies.len())]
    }

    /// The `n` instruments with the highest volatility.
    pub fn most_active(&self, n: usize) -> Vec<(&str, &InstrumentMetrics)> {
        let mut all: Vec<_> = self.metrics.iter().collect();
        all.sort_by(|a, b| b.1.volatility.total_cmp(&a.1.volatility));
        all.truncate(n);
        all
    }

    /// Alert messages as plain text.
    pub fn messages(&self) -> Vec<String> {
        self.alerts.iter().map(Alert::to_string).collect()
    }
}

/// Log a human-readable cycle summary.
pub fn log_report(report: &CycleReport) {
    let res = &report.resolution;
    let _cycle = super::cycle_span(report.cycle_id, res).entered();

    if report.shortlist.is_empty() {
        info!("No suitable pairs to trade ({res})");
    } else {
        info!("Best pairs to trade ({res}):");
        for candidate in &report.shortlist {
            info!("{candidate}");
        }
    }

    info!("Top active currencies ({res}):");
    for currency in report.top_currencies(TOP_CURRENCIES) {
        info!("{currency}");
    }

    for message in report.messages() {
        info!("{message}");
    }

    info!("Active pairs ({res}):");
    for (symbol, metrics) in report.most_active(MOST_ACTIVE) {
        info!("{symbol}: {metrics}");
    }

    info!(
        evaluated = report.metrics.len(),
        skipped = report.skipped.len(),
        picks = report.shortlist.len(),
        alerts = report.alerts.len(),
        "Cycle complete"
    );
}
