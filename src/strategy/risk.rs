//! Risk policy.
//!
//! Entry gate for new trades and the stop-loss circuit breaker. Both are
//! pure functions of the numbers handed in; the trading loop owns when
//! they are evaluated.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use super::SkipReason;
use crate::config::TradingConfig;
use crate::types::Signal;

#[derive(Debug, Clone)]
pub struct RiskConfig {
    /// Minimum confidence (percent) the top signal needs.
    pub min_confidence: u8,
    /// Allowed drawdown below the initial balance before trading halts.
    pub stop_loss: Decimal,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            min_confidence: 75,
            stop_loss: dec!(5),
        }
    }
}

impl From<&TradingConfig> for RiskConfig {
    fn from(cfg: &TradingConfig) -> Self {
        Self {
            min_confidence: cfg.min_confidence,
            stop_loss: cfg.stop_loss,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RiskManager {
    config: RiskConfig,
    initial_balance: Decimal,
}

impl RiskManager {
    pub fn new(config: RiskConfig, initial_balance: Decimal) -> Self {
        Self {
            config,
            initial_balance,
        }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Balance below which the stop-loss fires.
    pub fn stop_loss_floor(&self) -> Decimal {
        self.initial_balance - self.config.stop_loss
    }

    /// Check whether a trade may be opened on `signal` with a `min_bet` stake.
    ///
    /// Requires `confidence >= min_confidence` and `balance > min_bet`.
    pub fn check_entry(
        &self,
        signal: &Signal,
        balance: Decimal,
        min_bet: Decimal,
    ) -> Result<(), SkipReason> {
        if signal.confidence < self.config.min_confidence {
            return Err(SkipReason::LowConfidence {
                confidence: signal.confidence,
                threshold: self.config.min_confidence,
            });
        }
        if balance <= min_bet {
            return Err(SkipReason::InsufficientBalance { balance, min_bet });
        }
        Ok(())
    }

    /// True when `balance` has fallen below the stop-loss floor.
    pub fn stop_loss_triggered(&self, balance: Decimal) -> bool {
        let floor = self.stop_loss_floor();
        if balance < floor {
            warn!(
                balance = format!("${:.2}", balance),
                floor = format!("${:.2}", floor),
                "Stop-loss breached"
            );
            true
        } else {
            false
        }
    }
}
