//! Autonomous trading loop.
//!
//! Two supervisory states, DISABLED (initial) and ENABLED. Each cycle reads
//! the top signal, opens at most one trade through the ledger, and checks
//! the stop-loss against the balance as it stood when the cycle started.
//! Settlement is deferred: the cycle hands back a [`PendingResolution`]
//! that the runtime fires after the resolution delay.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};
use uuid::Uuid;

use super::ledger::Ledger;
use super::random::RandomSource;
use crate::strategy::risk::RiskManager;
use crate::strategy::{Decision, SkipReason};
use crate::types::{Signal, Trade, TraderState};

/// A trade waiting to be settled. Carries the confidence captured at open.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingResolution {
    pub trade_id: Uuid,
    pub confidence: u8,
}

impl PendingResolution {
    pub fn win_probability(&self) -> f64 {
        f64::from(self.confidence) / 100.0
    }
}

/// Summary of one trading cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle_number: u64,
    pub top_signal: Option<Signal>,
    pub decision: Decision,
    pub opened: Option<Trade>,
    pub balance_at_start: Decimal,
    pub balance_after: Decimal,
    pub stop_loss_tripped: bool,
    pub timestamp: DateTime<Utc>,
}

impl CycleReport {
    pub fn pending(&self) -> Option<PendingResolution> {
        self.opened.as_ref().map(|t| PendingResolution {
            trade_id: t.id,
            confidence: t.confidence,
        })
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cycle #{}: {} | balance ${:.2} -> ${:.2}{}",
            self.cycle_number,
            self.decision,
            self.balance_at_start,
            self.balance_after,
            if self.stop_loss_tripped { " | STOP-LOSS" } else { "" },
        )
    }
}

pub struct AutoTrader {
    state: TraderState,
    risk: RiskManager,
    cycles_run: u64,
}

impl AutoTrader {
    pub fn new(risk: RiskManager) -> Self {
        Self {
            state: TraderState::Disabled,
            risk,
            cycles_run: 0,
        }
    }

    pub fn state(&self) -> TraderState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state == TraderState::Enabled
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }

    /// Switch state. Returns true if the state actually changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        let next = if enabled {
            TraderState::Enabled
        } else {
            TraderState::Disabled
        };
        if next == self.state {
            return false;
        }
        info!(from = %self.state, to = %next, "Auto-trading state changed");
        self.state = next;
        true
    }

    /// Run one cycle against the latest `signals` (ranked, best first).
    pub fn run_cycle(
        &mut self,
        signals: &[Signal],
        ledger: &mut Ledger,
        min_bet: Decimal,
    ) -> CycleReport {
        let balance_at_start = ledger.balance();
        let top_signal = signals.first().cloned();

        if !self.is_enabled() {
            return CycleReport {
                cycle_number: self.cycles_run,
                top_signal,
                decision: Decision::Skipped {
                    reason: SkipReason::Disabled,
                },
                opened: None,
                balance_at_start,
                balance_after: balance_at_start,
                stop_loss_tripped: false,
                timestamp: Utc::now(),
            };
        }

        self.cycles_run += 1;

        let (decision, opened) = match &top_signal {
            None => (
                Decision::Skipped {
                    reason: SkipReason::NoSignals,
                },
                None,
            ),
            Some(signal) => self.try_open(signal, ledger, balance_at_start, min_bet),
        };

        let stop_loss_tripped = self.risk.stop_loss_triggered(balance_at_start);
        if stop_loss_tripped {
            warn!(cycle = self.cycles_run, "Stop-loss hit, disabling auto-trading");
            self.state = TraderState::Disabled;
        }

        let report = CycleReport {
            cycle_number: self.cycles_run,
            top_signal,
            decision,
            opened,
            balance_at_start,
            balance_after: ledger.balance(),
            stop_loss_tripped,
            timestamp: Utc::now(),
        };
        info!(
            cycle = report.cycle_number,
            decision = %report.decision,
            balance = format!("${:.2}", report.balance_after),
            state = %self.state,
            "Cycle complete"
        );
        report
    }

    fn try_open(
        &self,
        signal: &Signal,
        ledger: &mut Ledger,
        balance: Decimal,
        min_bet: Decimal,
    ) -> (Decision, Option<Trade>) {
        if let Err(reason) = self.risk.check_entry(signal, balance, min_bet) {
            return (Decision::Skipped { reason }, None);
        }

        match ledger.open_trade(signal, min_bet) {
            Ok(trade) => (
                Decision::Opened {
                    pair: trade.pair.clone(),
                    confidence: trade.confidence,
                    stake: trade.stake,
                },
                Some(trade),
            ),
            Err(e) => {
                warn!(error = %e, pair = %signal.pair, "Ledger rejected trade, skipping cycle");
                (
                    Decision::Skipped {
                        reason: SkipReason::Rejected {
                            message: e.to_string(),
                        },
                    },
                    None,
                )
            }
        }
    }

    /// Settle a pending trade: win with probability `confidence / 100`.
    ///
    /// Returns the settled trade, or `None` if the ledger had nothing
    /// active under that id.
    pub fn resolve(
        pending: &PendingResolution,
        ledger: &mut Ledger,
        rng: &mut dyn RandomSource,
    ) -> Option<Trade> {
        let won = rng.next_unit() < pending.win_probability();
        ledger.resolve_trade(pending.trade_id, won)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
