//! Ledger: bankroll and trade history bookkeeping.
//!
//! Pure accounting: opens debit the stake, winning resolutions credit the
//! stake back plus the payout, losing ones leave the debit in place. No
//! trading decisions are made here.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use tracing::{debug, info};
use uuid::Uuid;

use crate::types::{LedgerSnapshot, Signal, SimError, Trade, TradeStatus};

pub const DEFAULT_PAYOUT_RATIO: Decimal = dec!(0.85);

pub struct Ledger {
    initial_balance: Decimal,
    balance: Decimal,
    payout_ratio: Decimal,
    /// Most recent first.
    trades: VecDeque<Trade>,
}

impl Ledger {
    pub fn new(initial_balance: Decimal) -> Self {
        Self::with_payout(initial_balance, DEFAULT_PAYOUT_RATIO)
    }

    pub fn with_payout(initial_balance: Decimal, payout_ratio: Decimal) -> Self {
        Self {
            initial_balance,
            balance: initial_balance,
            payout_ratio,
            trades: VecDeque::new(),
        }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn initial_balance(&self) -> Decimal {
        self.initial_balance
    }

    /// Open an ACTIVE trade on `signal` and debit the stake.
    ///
    /// Rejects a non-positive stake or one larger than the balance; the
    /// stake is never clamped.
    pub fn open_trade(&mut self, signal: &Signal, stake: Decimal) -> Result<Trade, SimError> {
        if stake <= Decimal::ZERO {
            return Err(SimError::InvalidStake(stake));
        }
        if stake > self.balance {
            return Err(SimError::InsufficientBalance {
                needed: stake,
                available: self.balance,
            });
        }

        let trade = Trade {
            id: Uuid::now_v7(),
            pair: signal.pair.clone(),
            direction: signal.direction,
            confidence: signal.confidence,
            stake,
            status: TradeStatus::Active,
            profit: Decimal::ZERO,
            opened_at: Utc::now(),
            resolved_at: None,
        };

        self.balance -= stake;
        self.trades.push_front(trade.clone());

        info!(
            trade_id = %trade.id,
            pair = %trade.pair,
            direction = %trade.direction,
            stake = format!("${:.2}", stake),
            balance = format!("${:.2}", self.balance),
            "Trade opened"
        );
        Ok(trade)
    }

    /// Settle the ACTIVE trade with `id`.
    ///
    /// Returns the settled trade, or `None` when no ACTIVE trade has that
    /// id (already settled or unknown). A second call never credits twice.
    pub fn resolve_trade(&mut self, id: Uuid, won: bool) -> Option<Trade> {
        let Some(trade) = self
            .trades
            .iter_mut()
            .find(|t| t.id == id && t.is_active())
        else {
            debug!(trade_id = %id, "No active trade to resolve, ignoring");
            return None;
        };

        let payout = trade.stake * self.payout_ratio;
        if won {
            trade.status = TradeStatus::Win;
            trade.profit = payout;
            self.balance += trade.stake + payout;
        } else {
            trade.status = TradeStatus::Loss;
            trade.profit = -trade.stake;
        }
        trade.resolved_at = Some(Utc::now());

        info!(
            trade_id = %trade.id,
            pair = %trade.pair,
            status = %trade.status,
            profit = format!("{:.2}", trade.profit),
            balance = format!("${:.2}", self.balance),
            "Trade resolved"
        );
        Some(trade.clone())
    }

    pub fn trade(&self, id: Uuid) -> Option<&Trade> {
        self.trades.iter().find(|t| t.id == id)
    }

    /// Current state with derived totals recomputed from history.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let total_profit: Decimal = self.trades.iter().map(|t| t.profit).sum();
        let wins = self.count(TradeStatus::Win);
        let losses = self.count(TradeStatus::Loss);
        let resolved = wins + losses;
        let win_rate = if resolved == 0 {
            0.0
        } else {
            wins as f64 / resolved as f64
        };

        LedgerSnapshot {
            trades: self.trades.iter().cloned().collect(),
            balance: self.balance,
            initial_balance: self.initial_balance,
            total_profit,
            win_rate,
            wins,
            losses,
            active_trades: self.count(TradeStatus::Active),
        }
    }

    fn count(&self, status: TradeStatus) -> usize {
        self.trades.iter().filter(|t| t.status == status).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
