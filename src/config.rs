//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every field has a default so a partial file (or no file at all) still
//! yields a runnable simulation.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Currency pairs traded when the config does not list any.
pub const DEFAULT_PAIRS: &[&str] = &[
    "EUR/USD", "GBP/USD", "USD/JPY", "AUD/USD", "USD/CHF", "EUR/GBP",
];

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub trading: TradingConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub name: String,
    pub initial_balance: Decimal,
    pub pairs: Vec<String>,
    pub signal_refresh_secs: u64,
    pub cycle_secs: u64,
    pub resolution_delay_secs: u64,
    /// Fixed RNG seed for reproducible runs. Entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Enable auto-trading immediately on startup.
    pub auto_start: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "OTC-SIM-001".to_string(),
            initial_balance: dec!(1000),
            pairs: DEFAULT_PAIRS.iter().map(|p| p.to_string()).collect(),
            signal_refresh_secs: 3,
            cycle_secs: 60,
            resolution_delay_secs: 60,
            seed: None,
            auto_start: false,
        }
    }
}

impl EngineConfig {
    pub fn signal_refresh(&self) -> Duration {
        Duration::from_secs(self.signal_refresh_secs)
    }

    pub fn cycle_period(&self) -> Duration {
        Duration::from_secs(self.cycle_secs)
    }

    pub fn resolution_delay(&self) -> Duration {
        Duration::from_secs(self.resolution_delay_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TradingConfig {
    /// Minimum top-signal confidence (percent) required to open a trade.
    pub min_confidence: u8,
    /// Drawdown below the initial balance that switches auto-trading off.
    pub stop_loss: Decimal,
    /// Fraction of the stake paid out on a winning trade.
    pub payout_ratio: Decimal,
    pub default_min_bet: Decimal,
    pub default_max_bet: Decimal,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            min_confidence: 75,
            stop_loss: dec!(5),
            payout_ratio: dec!(0.85),
            default_min_bet: dec!(0.5),
            default_max_bet: dec!(100),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load configuration, falling back to defaults when the file is absent.
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            warn!(path, "Config file not found, using built-in defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }
}
