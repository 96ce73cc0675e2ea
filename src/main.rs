//! PULSE — Forex volatility and smart-money scanner
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the series feed, and evaluates every resolution on a fixed
//! interval until interrupted.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use pulse::config::{self, FeedKind};
use pulse::dashboard::{self, routes::DashboardState};
use pulse::engine::{self, report};
use pulse::feed::bridge::BridgeFeed;
use pulse::feed::replay::ReplayFeed;
use pulse::feed::SeriesFeed;

const BANNER: &str = r#"
 ____  _   _ _     ____  _____
|  _ \| | | | |   / ___|| ____|
| |_) | | | | |   \___ \|  _|
|  __/| |_| | |___ ___) | |___
|_|    \___/|_____|____/|_____|

  Volatility & smart-money scanner
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = config::AppConfig::load(&config::AppConfig::path_from_env())?;

    init_logging();

    println!("{BANNER}");
    info!(
        scanner = %cfg.scanner.name,
        poll_interval_secs = cfg.scanner.poll_interval_secs,
        instruments = cfg.instruments.len(),
        resolutions = cfg.resolutions.len(),
        volatility_threshold = cfg.thresholds.volatility_threshold,
        price_change_threshold = cfg.thresholds.price_change_threshold,
        "PULSE starting up"
    );

    let feed = build_feed(&cfg)?;
    info!(feed = feed.name(), "Series feed ready");

    let dashboard_state = Arc::new(DashboardState::new(cfg.scanner.name.clone()));
    if cfg.dashboard.enabled {
        dashboard::spawn_dashboard(dashboard_state.clone(), cfg.dashboard.port).await?;
    }

    // -- Main loop -------------------------------------------------------

    let mut interval = tokio::time::interval(Duration::from_secs(cfg.scanner.poll_interval_secs));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval_secs = cfg.scanner.poll_interval_secs,
        "Entering main loop. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                for resolution in &cfg.resolutions {
                    let report = engine::run_cycle(feed.as_ref(), &cfg, resolution).await;
                    report::log_report(&report);
                    dashboard_state.publish(report).await;
                }
                info!(
                    "Waiting {} seconds before next check...",
                    cfg.scanner.poll_interval_secs
                );
            }
            _ = &mut shutdown => {
                info!("Monitoring stopped by user");
                break;
            }
        }
    }

    Ok(())
}

/// Build the configured series feed.
fn build_feed(cfg: &config::AppConfig) -> Result<Box<dyn SeriesFeed>> {
    match cfg.feed.kind {
        FeedKind::Bridge => {
            let base_url = cfg
                .feed
                .base_url
                .as_deref()
                .context("bridge feed requires base_url")?;
            let token = cfg.feed_token()?;
            if token.is_none() {
                warn!("No bridge token configured, sending unauthenticated requests");
            }
            Ok(Box::new(BridgeFeed::new(base_url, token, cfg.feed.timeout_secs)?))
        }
        FeedKind::Replay => {
            let dir = cfg
                .feed
                .replay_dir
                .as_deref()
                .context("replay feed requires replay_dir")?;
            Ok(Box::new(ReplayFeed::new(dir)))
        }
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pulse=info"));

    let json_logging = std::env::var("PULSE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
