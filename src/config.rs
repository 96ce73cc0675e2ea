//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` (or the file named by `PULSE_CONFIG`) and
//! deserializes into strongly-typed structs. The bridge token is referenced
//! by env-var name in the config and resolved at runtime.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;

use crate::analysis::reversal::DetectorParams;
use crate::engine::selector::SelectionConfig;
use crate::types::{CurrencyPair, Resolution, ScanError, Thresholds};

/// Default config path when `PULSE_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Longest rolling window a resolution may ask for.
pub const MAX_LOOKBACK: usize = 10_000;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub scanner: ScannerConfig,
    pub thresholds: Thresholds,
    #[serde(default)]
    pub detector: DetectorParams,
    #[serde(default)]
    pub selection: SelectionConfig,
    pub resolutions: Vec<Resolution>,
    pub instruments: Vec<String>,
    pub feed: FeedConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScannerConfig {
    pub name: String,
    pub poll_interval_secs: u64,
}

/// Which feed implementation to use.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Bridge,
    Replay,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub kind: FeedKind,
    /// Rates bridge base URL (bridge feed).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Env var holding the bridge bearer token, if any.
    #[serde(default)]
    pub token_env: Option<String>,
    /// Directory of rate files (replay feed).
    #[serde(default)]
    pub replay_dir: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    crate::feed::bridge::DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub enabled: bool,
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
}

fn default_dashboard_port() -> u16 {
    8080
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_dashboard_port(),
        }
    }
}

/// Finite and at least zero. NaN fails.
fn non_negative(x: f64) -> bool {
    x.is_finite() && x >= 0.0
}

impl AppConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("Invalid config file: {path}"))?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Path from `PULSE_CONFIG`, falling back to `config.toml`.
    pub fn path_from_env() -> String {
        std::env::var("PULSE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ScanError> {
        let t = &self.thresholds;
        if !non_negative(t.volatility_threshold) || !non_negative(t.price_change_threshold) {
            return Err(ScanError::Config("thresholds must be finite and non-negative".into()));
        }
        if self.instruments.is_empty() {
            return Err(ScanError::Config("instrument list is empty".into()));
        }
        if self.resolutions.is_empty() {
            return Err(ScanError::Config("no resolutions configured".into()));
        }
        if let Some(r) = self
            .resolutions
            .iter()
            .find(|r| r.lookback < 1 || r.lookback > MAX_LOOKBACK)
        {
            return Err(ScanError::Config(format!(
                "resolution {} needs a lookback between 1 and {MAX_LOOKBACK}",
                r.name
            )));
        }
        let d = &self.detector;
        if !(d.volume_multiplier.is_finite() && d.volume_multiplier > 0.0) {
            return Err(ScanError::Config("volume_multiplier must be finite and positive".into()));
        }
        if !non_negative(d.reversal_epsilon) {
            return Err(ScanError::Config(
                "reversal_epsilon must be finite and non-negative".into(),
            ));
        }
        if self.selection.max_picks == 0 {
            return Err(ScanError::Config("max_picks must be at least 1".into()));
        }
        if self.scanner.poll_interval_secs == 0 {
            return Err(ScanError::Config("poll_interval_secs must be at least 1".into()));
        }
        for symbol in &self.instruments {
            CurrencyPair::parse(symbol)?;
        }
        match self.feed.kind {
            FeedKind::Bridge if self.feed.base_url.is_none() => {
                Err(ScanError::Config("bridge feed requires base_url".into()))
            }
            FeedKind::Replay if self.feed.replay_dir.is_none() => {
                Err(ScanError::Config("replay feed requires replay_dir".into()))
            }
            _ => Ok(()),
        }
    }

    /// Resolve the bridge token from the environment, if configured.
    pub fn feed_token(&self) -> Result<Option<SecretString>> {
        match &self.feed.token_env {
            Some(env) => Ok(Some(SecretString::new(Self::resolve_env(env)?))),
            None => Ok(None),
        }
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
