//! Shared types for the OTC auto-trader.
//!
//! These types form the data model used across all modules: signals,
//! trades, ledger snapshots, settings, and the domain error enum.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Signal
// ---------------------------------------------------------------------------

/// Trade direction forecast by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Up,
    Down,
    Sideways,
}

impl Trend {
    pub const ALL: &'static [Trend] = &[Trend::Up, Trend::Down, Trend::Sideways];
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "UP"),
            Trend::Down => write!(f, "DOWN"),
            Trend::Sideways => write!(f, "SIDEWAYS"),
        }
    }
}

/// A forecast for one pair at the current tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub pair: String,
    pub direction: Direction,
    /// Estimated win probability in percent (65–94).
    pub confidence: u8,
    /// Volatility in percent (20–59).
    pub volatility: u8,
    pub trend: Trend,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} conf={}% vol={}% trend={}",
            self.pair, self.direction, self.confidence, self.volatility, self.trend,
        )
    }
}

// ---------------------------------------------------------------------------
// Trade
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    Active,
    Win,
    Loss,
}

impl TradeStatus {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, TradeStatus::Active)
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeStatus::Active => write!(f, "ACTIVE"),
            TradeStatus::Win => write!(f, "WIN"),
            TradeStatus::Loss => write!(f, "LOSS"),
        }
    }
}

/// A single simulated wager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Time-ordered (v7) id.
    pub id: Uuid,
    pub pair: String,
    pub direction: Direction,
    /// Signal confidence captured when the trade was opened.
    pub confidence: u8,
    pub stake: Decimal,
    pub status: TradeStatus,
    /// Zero while active.
    pub profit: Decimal,
    pub opened_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.profit >= Decimal::ZERO { "+" } else { "" };
        write!(
            f,
            "[{}] {} {} ${:.2} {} ({sign}{:.2})",
            self.status, self.direction, self.pair, self.stake, self.id, self.profit,
        )
    }
}

impl Trade {
    pub fn is_active(&self) -> bool {
        !self.status.is_resolved()
    }
}

// ---------------------------------------------------------------------------
// Ledger snapshot
// ---------------------------------------------------------------------------

/// Read-only view of the bankroll and trade history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Most recent first.
    pub trades: Vec<Trade>,
    pub balance: Decimal,
    pub initial_balance: Decimal,
    pub total_profit: Decimal,
    /// wins / (wins + losses), 0 when nothing has resolved.
    pub win_rate: f64,
    pub wins: usize,
    pub losses: usize,
    pub active_trades: usize,
}

impl fmt::Display for LedgerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "balance=${:.2} | PnL=${:.2} | trades={} (W{}/L{}/A{}) | win_rate={:.1}%",
            self.balance,
            self.total_profit,
            self.trades.len(),
            self.wins,
            self.losses,
            self.active_trades,
            self.win_rate * 100.0,
        )
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// User-facing engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub min_bet: Decimal,
    pub max_bet: Decimal,
    pub auto_trading: bool,
    pub selected_pair: String,
}

/// Supervisory state of the autonomous trading loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TraderState {
    Disabled,
    Enabled,
}

impl fmt::Display for TraderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraderState::Disabled => write!(f, "🔴 DISABLED"),
            TraderState::Enabled => write!(f, "🟢 ENABLED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

/// One synthetic OHLC candle for the chart view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("Invalid {setting}: {value} (allowed {min}..={max}, step {step})")]
    InvalidBet {
        setting: &'static str,
        value: Decimal,
        min: Decimal,
        max: Decimal,
        step: Decimal,
    },

    #[error("Unknown pair: {0}")]
    UnknownPair(String),

    #[error("Insufficient balance: need ${needed:.2}, have ${available:.2}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    #[error("Invalid stake: {0}")]
    InvalidStake(Decimal),

    #[error("Engine is not running")]
    EngineStopped,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
