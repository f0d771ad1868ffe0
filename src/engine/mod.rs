//! Core engine: signal generation, the ledger and the autonomous trading loop.
//!
//! [`Engine`] owns every piece of mutable simulation state and exposes the
//! command/query surface. It is synchronous; [`runtime`] wraps it in a
//! single-writer tokio task that drives the timers.

pub mod candles;
pub mod ledger;
pub mod random;
pub mod runtime;
pub mod settings;
pub mod signals;
pub mod trader;

use anyhow::{ensure, Result};
use rust_decimal::Decimal;
use tracing::info;

use crate::config::AppConfig;
use crate::strategy::risk::{RiskConfig, RiskManager};
use crate::types::{Candle, EngineSettings, LedgerSnapshot, Signal, SimError, Trade, TraderState};
use ledger::Ledger;
use random::RandomSource;
use settings::{MAX_BET_LIMITS, MIN_BET_LIMITS};
use signals::SignalGenerator;
use trader::{AutoTrader, CycleReport, PendingResolution};

pub struct Engine {
    generator: SignalGenerator,
    ledger: Ledger,
    trader: AutoTrader,
    signals: Vec<Signal>,
    candles: Vec<Candle>,
    min_bet: Decimal,
    max_bet: Decimal,
    selected_pair: String,
    rng: Box<dyn RandomSource>,
}

impl Engine {
    /// Build an engine from config. Signals and candles are drawn immediately
    /// so queries never see an empty state.
    pub fn new(cfg: &AppConfig, mut rng: Box<dyn RandomSource>) -> Result<Self> {
        ensure!(
            cfg.engine.initial_balance > Decimal::ZERO,
            "initial_balance must be positive"
        );
        ensure!(
            cfg.trading.payout_ratio > Decimal::ZERO,
            "payout_ratio must be positive"
        );
        ensure!(
            cfg.engine.signal_refresh_secs > 0,
            "signal_refresh_secs must be non-zero"
        );
        ensure!(cfg.engine.cycle_secs > 0, "cycle_secs must be non-zero");
        let min_bet = MIN_BET_LIMITS.validate(cfg.trading.default_min_bet)?;
        let max_bet = MAX_BET_LIMITS.validate(cfg.trading.default_max_bet)?;

        let generator = SignalGenerator::new(cfg.engine.pairs.clone());
        let signals = generator.generate(&mut *rng);
        let candles =
            candles::generate_candles(&mut *rng, candles::BASE_PRICE, candles::CANDLE_COUNT);
        let selected_pair = generator.pairs().first().cloned().unwrap_or_default();

        let risk = RiskManager::new(RiskConfig::from(&cfg.trading), cfg.engine.initial_balance);

        info!(
            pairs = cfg.engine.pairs.len(),
            initial_balance = format!("${:.2}", cfg.engine.initial_balance),
            min_bet = %min_bet,
            max_bet = %max_bet,
            "Engine initialised"
        );

        Ok(Self {
            generator,
            ledger: Ledger::with_payout(cfg.engine.initial_balance, cfg.trading.payout_ratio),
            trader: AutoTrader::new(risk),
            signals,
            candles,
            min_bet,
            max_bet,
            selected_pair,
            rng,
        })
    }

    // -- Queries ---------------------------------------------------------

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn ledger_snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            min_bet: self.min_bet,
            max_bet: self.max_bet,
            auto_trading: self.trader.is_enabled(),
            selected_pair: self.selected_pair.clone(),
        }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn trader_state(&self) -> TraderState {
        self.trader.state()
    }

    pub fn balance(&self) -> Decimal {
        self.ledger.balance()
    }

    // -- Commands --------------------------------------------------------

    /// Returns true if the loop changed state.
    pub fn set_auto_trading(&mut self, enabled: bool) -> bool {
        self.trader.set_enabled(enabled)
    }

    pub fn set_min_bet(&mut self, value: Decimal) -> Result<(), SimError> {
        self.min_bet = MIN_BET_LIMITS.validate(value)?;
        info!(min_bet = %self.min_bet, "Min bet updated");
        Ok(())
    }

    /// Stored for display only; the trading loop always stakes `min_bet`.
    pub fn set_max_bet(&mut self, value: Decimal) -> Result<(), SimError> {
        self.max_bet = MAX_BET_LIMITS.validate(value)?;
        info!(max_bet = %self.max_bet, "Max bet updated");
        Ok(())
    }

    pub fn select_pair(&mut self, pair: &str) -> Result<(), SimError> {
        if !self.generator.has_pair(pair) {
            return Err(SimError::UnknownPair(pair.to_string()));
        }
        self.selected_pair = pair.to_string();
        Ok(())
    }

    // -- Timer events ----------------------------------------------------

    /// Replace the signal set wholesale.
    pub fn refresh_signals(&mut self) {
        self.signals = self.generator.generate(&mut *self.rng);
    }

    pub fn run_cycle(&mut self) -> CycleReport {
        self.trader
            .run_cycle(&self.signals, &mut self.ledger, self.min_bet)
    }

    pub fn resolve(&mut self, pending: &PendingResolution) -> Option<Trade> {
        AutoTrader::resolve(pending, &mut self.ledger, &mut *self.rng)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
