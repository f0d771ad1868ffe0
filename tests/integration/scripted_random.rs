//! Scripted random source for integration testing.
//!
//! Signal confidence is pinned and trade outcomes are read from a fixed
//! script, so ledger arithmetic can be asserted exactly.

use std::collections::VecDeque;

use otc_autotrader::engine::candles::CANDLE_COUNT;
use otc_autotrader::engine::random::RandomSource;

/// Unit draw that always wins (below any confidence).
pub const WIN: f64 = 0.0;
/// Unit draw that always loses (at or above any confidence).
pub const LOSS: f64 = 0.999;

/// Unit draws the engine spends on the chart series at construction.
const STARTUP_UNIT_DRAWS: usize = CANDLE_COUNT * 3;

pub struct ScriptedRandom {
    confidence: u32,
    outcomes: VecDeque<f64>,
    startup_left: usize,
    /// Returned for startup draws and once the script runs out.
    fallback: f64,
}

impl ScriptedRandom {
    pub fn new(confidence: u32) -> Self {
        Self {
            confidence,
            outcomes: VecDeque::new(),
            startup_left: STARTUP_UNIT_DRAWS,
            fallback: 0.5,
        }
    }

    /// Queue unit draws consumed by trade resolutions, in order.
    pub fn with_outcomes(mut self, outcomes: &[f64]) -> Self {
        self.outcomes = outcomes.iter().copied().collect();
        self
    }
}

impl RandomSource for ScriptedRandom {
    fn next_bool(&mut self) -> bool {
        true
    }

    fn next_in_range(&mut self, low: u32, high: u32) -> u32 {
        // Confidence is the only draw starting at 65.
        if low == 65 {
            self.confidence.clamp(low, high)
        } else {
            low
        }
    }

    fn next_unit(&mut self) -> f64 {
        if self.startup_left > 0 {
            self.startup_left -= 1;
            return self.fallback;
        }
        self.outcomes.pop_front().unwrap_or(self.fallback)
    }
}
