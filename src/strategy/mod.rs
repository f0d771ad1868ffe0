//! Strategy: trade decisions and the risk rules behind them.

pub mod risk;

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Decision log
// ---------------------------------------------------------------------------

/// What a trading cycle decided to do, including why it passed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decision {
    /// Trade opened on the top signal.
    Opened {
        pair: String,
        confidence: u8,
        stake: Decimal,
    },
    /// No trade this cycle.
    Skipped { reason: SkipReason },
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Opened {
                pair,
                confidence,
                stake,
            } => write!(f, "opened {pair} conf={confidence}% stake=${stake:.2}"),
            Decision::Skipped { reason } => write!(f, "skipped: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Auto-trading is off.
    Disabled,
    /// The signal set is empty.
    NoSignals,
    LowConfidence { confidence: u8, threshold: u8 },
    InsufficientBalance { balance: Decimal, min_bet: Decimal },
    /// The ledger refused the open.
    Rejected { message: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled => write!(f, "auto-trading disabled"),
            SkipReason::NoSignals => write!(f, "no signals"),
            SkipReason::LowConfidence {
                confidence,
                threshold,
            } => write!(f, "confidence {confidence}% below {threshold}%"),
            SkipReason::InsufficientBalance { balance, min_bet } => {
                write!(f, "balance ${balance:.2} not above min bet ${min_bet:.2}")
            }
            SkipReason::Rejected { message } => write!(f, "rejected: {message}"),
        }
    }
}
