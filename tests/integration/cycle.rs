//! End-to-end cycle tests: rank → select → notify against a mock feed.

use pulse::config::AppConfig;
use pulse::engine::{self, notifier::{Alert, ReversalKind}, report::TOP_CURRENCIES};
use pulse::feed::replay::ReplayFeed;
use pulse::feed::RateRow;
use pulse::types::{Resolution, Timeframe};

use crate::mock_feed::{self, MockFeed};

fn config(instruments: &[&str]) -> AppConfig {
    let list = instruments
        .iter()
        .map(|s| format!("\"{s}\""))
        .collect::<Vec<_>>()
        .join(", ");
    AppConfig::parse(&format!(
        r#"
instruments = [{list}]

[scanner]
name = "PULSE-IT"
poll_interval_secs = 60

[thresholds]
volatility_threshold = 0.0006
price_change_threshold = 0.5

[[resolutions]]
name = "30min"
timeframe = "M30"
lookback = 14

[feed]
kind = "replay"
replay_dir = "unused"
"#
    ))
    .unwrap()
}

fn standard_config() -> AppConfig {
    config(&["EURUSDm", "GBPUSDm", "AUDCADm", "NZDJPYm", "USDCHFm"])
}

fn resolution(cfg: &AppConfig) -> Resolution {
    cfg.resolutions[0].clone()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[tokio::test]
async fn test_cycle_skips_unavailable_instrument() {
    let cfg = standard_config();
    let feed = MockFeed::standard();
    let report = engine::run_cycle(&feed, &cfg, &resolution(&cfg)).await;

    let symbols: Vec<&str> = report.metrics.iter().map(|(s, _)| s).collect();
    assert_eq!(symbols, vec!["EURUSDm", "GBPUSDm", "AUDCADm", "USDCHFm"]);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].starts_with("NZDJPYm"));
}

#[tokio::test]
async fn test_cycle_requests_lookback_plus_two_bars() {
    let cfg = standard_config();
    let feed = MockFeed::standard();
    engine::run_cycle(&feed, &cfg, &resolution(&cfg)).await;

    let requests = feed.requests();
    assert_eq!(requests.len(), 5);
    for (symbol, (requested, timeframe, count)) in cfg.instruments.iter().zip(&requests) {
        assert_eq!(symbol, requested);
        assert_eq!(*timeframe, Timeframe::M30);
        assert_eq!(*count, 16);
    }
}

#[tokio::test]
async fn test_cycle_metrics() {
    let cfg = standard_config();
    let feed = MockFeed::standard();
    let report = engine::run_cycle(&feed, &cfg, &resolution(&cfg)).await;

    let eurusd = report.metrics.get("EURUSDm").unwrap();
    assert!(approx(eurusd.volatility, 0.0020));
    assert!(approx(eurusd.price_change_pct, 0.0));
    assert!(!eurusd.smart_money);

    let gbpusd = report.metrics.get("GBPUSDm").unwrap();
    assert!(approx(gbpusd.volatility, 0.0010));
    // 16 of 20 bars served: closes 1.2520 -> 1.2595.
    assert!((gbpusd.price_change_pct - 0.0075 / 1.252 * 100.0).abs() < 1e-6);
    assert!(gbpusd.price_change_pct > 0.5);
    assert!(!gbpusd.smart_money);

    let usdchf = report.metrics.get("USDCHFm").unwrap();
    assert!(usdchf.volume_spike);
    assert!(usdchf.bullish_reversal);
    assert!(!usdchf.bearish_reversal);
    assert!(usdchf.smart_money);
    assert!(usdchf.volatility < 0.0006);
}

#[tokio::test]
async fn test_cycle_ranks_currencies() {
    let cfg = standard_config();
    let feed = MockFeed::standard();
    let report = engine::run_cycle(&feed, &cfg, &resolution(&cfg)).await;

    let order: Vec<&str> = report.currencies.iter().map(|c| c.currency.as_str()).collect();
    assert_eq!(order, vec!["EUR", "USD", "GBP", "CHF", "AUD", "CAD"]);

    let usd = &report.currencies[1];
    assert_eq!(usd.exposure.sample_count, 3);

    let top: Vec<&str> = report
        .top_currencies(TOP_CURRENCIES)
        .iter()
        .map(|c| c.currency.as_str())
        .collect();
    assert_eq!(top, vec!["EUR", "USD", "GBP"]);
}

#[tokio::test]
async fn test_cycle_shortlist_avoids_shared_currency() {
    let cfg = standard_config();
    let feed = MockFeed::standard();
    let report = engine::run_cycle(&feed, &cfg, &resolution(&cfg)).await;

    // EURUSDm outscores GBPUSDm (0.5 vs 0.3) and both carry USD.
    let picks: Vec<&str> = report.shortlist.iter().map(|c| c.symbol.as_str()).collect();
    assert_eq!(picks, vec!["EURUSDm"]);
    assert!(approx(report.shortlist[0].composite_score, 0.5));
}

#[tokio::test]
async fn test_cycle_alerts() {
    let cfg = standard_config();
    let feed = MockFeed::standard();
    let report = engine::run_cycle(&feed, &cfg, &resolution(&cfg)).await;

    assert_eq!(report.alerts.len(), 4);
    assert!(matches!(&report.alerts[0], Alert::HighActivity { symbol, .. } if symbol == "EURUSDm"));
    assert!(matches!(&report.alerts[1], Alert::HighActivity { symbol, .. } if symbol == "GBPUSDm"));
    assert_eq!(
        report.alerts[2],
        Alert::SmartMoney {
            symbol: "USDCHFm".into(),
            reversal: ReversalKind::Bullish,
        }
    );
    assert_eq!(report.alerts[3], Alert::Shortfall { found: 2 });

    let messages = report.messages();
    assert_eq!(
        messages[0],
        "High activity detected in EURUSDm: ATR=0.00200, Price Change=0.00%"
    );
    assert_eq!(
        messages[2],
        "Smart money activity detected in USDCHFm: Bullish reversal with volume spike"
    );
    assert_eq!(messages[3], "Note: Only 2 high activity pair(s) detected");
}

#[tokio::test]
async fn test_cycle_with_no_data() {
    let cfg = standard_config();
    let feed = MockFeed::new();
    let report = engine::run_cycle(&feed, &cfg, &resolution(&cfg)).await;

    assert!(report.metrics.is_empty());
    assert!(report.currencies.is_empty());
    assert!(report.shortlist.is_empty());
    assert_eq!(report.skipped.len(), 5);
    assert_eq!(report.alerts, vec![Alert::Shortfall { found: 0 }]);
}

#[tokio::test]
async fn test_cycle_short_history_is_skipped() {
    let cfg = config(&["EURUSDm", "GBPUSDm"]);
    let feed = MockFeed::new()
        .with_bars("EURUSDm", mock_feed::flat(1.1, 0.0020, 20))
        .with_bars("GBPUSDm", mock_feed::flat(1.25, 0.0020, 10));
    let report = engine::run_cycle(&feed, &cfg, &resolution(&cfg)).await;

    assert_eq!(report.metrics.len(), 1);
    assert!(report.metrics.get("GBPUSDm").is_none());
    assert_eq!(report.skipped.len(), 1);
}

#[tokio::test]
async fn test_cycles_are_repeatable() {
    let cfg = standard_config();
    let feed = MockFeed::standard();
    let first = engine::run_cycle(&feed, &cfg, &resolution(&cfg)).await;
    let second = engine::run_cycle(&feed, &cfg, &resolution(&cfg)).await;

    assert_ne!(first.cycle_id, second.cycle_id);
    assert_eq!(first.metrics, second.metrics);
    assert_eq!(first.alerts, second.alerts);
    assert_eq!(first.messages(), second.messages());
}

#[tokio::test]
async fn test_cycle_from_replay_files() {
    let dir = std::env::temp_dir().join(format!("pulse-it-{}", uuid::Uuid::new_v4()));
    let replay = ReplayFeed::new(&dir);
    let rows: Vec<RateRow> = mock_feed::bullish_spike(20)
        .iter()
        .map(|b| RateRow {
            time: b.time.timestamp(),
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
            tick_volume: b.tick_volume,
            spread: None,
            real_volume: None,
        })
        .collect();
    replay.write_rows("USDCHFm", Timeframe::M30, &rows).unwrap();

    let cfg = config(&["USDCHFm", "EURGBPm"]);
    let report = engine::run_cycle(&replay, &cfg, &resolution(&cfg)).await;

    assert_eq!(report.metrics.len(), 1);
    assert!(report.metrics.get("USDCHFm").unwrap().smart_money);
    assert!(report.skipped[0].starts_with("EURGBPm"));
    assert_eq!(
        report.alerts.last(),
        Some(&Alert::Shortfall { found: 0 })
    );

    let _ = std::fs::remove_dir_all(&dir);
}
