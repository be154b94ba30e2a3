//! Monitor configuration.

use crate::error::{AppError, AppResult};
use depthwatch_core::SessionConfig;
use depthwatch_ws::FeedConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Monitor configuration, loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Trading pair to monitor (case-insensitive, e.g. "btcusdt").
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Minimum ask notional value to surface (quote asset).
    #[serde(default = "default_threshold")]
    pub ask_threshold: Decimal,
    /// Minimum bid notional value to surface (quote asset).
    #[serde(default = "default_threshold")]
    pub bid_threshold: Decimal,
    /// Feed endpoint settings.
    #[serde(default)]
    pub feed: FeedSettings,
}

fn default_symbol() -> String {
    "btcusdt".to_string()
}

fn default_threshold() -> Decimal {
    Decimal::from(10_000)
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            ask_threshold: default_threshold(),
            bid_threshold: default_threshold(),
            feed: FeedSettings::default(),
        }
    }
}

/// Feed endpoint settings subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSettings {
    /// WebSocket endpoint base, without the stream path.
    pub url: String,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            url: FeedConfig::default().url,
        }
    }
}

impl MonitorConfig {
    /// Load from a file if it exists, otherwise fall back to defaults.
    pub fn load(path: &str) -> AppResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(%path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Validated per-session parameters.
    pub fn session_config(&self) -> AppResult<SessionConfig> {
        Ok(SessionConfig::new(
            &self.symbol,
            self.ask_threshold,
            self.bid_threshold,
        )?)
    }

    /// Feed connection settings.
    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            url: self.feed.url.clone(),
        }
    }
}
