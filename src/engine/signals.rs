//! Signal generator.
//!
//! Produces a fresh, ranked set of synthetic signals for every configured
//! pair. The set is always rebuilt wholesale; callers replace their copy.

use std::ops::RangeInclusive;
use tracing::debug;

use super::random::RandomSource;
use crate::types::{Direction, Signal, Trend};

pub const CONFIDENCE_RANGE: RangeInclusive<u8> = 65..=94;
pub const VOLATILITY_RANGE: RangeInclusive<u8> = 20..=59;

pub struct SignalGenerator {
    pairs: Vec<String>,
}

impl SignalGenerator {
    pub fn new(pairs: Vec<String>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[String] {
        &self.pairs
    }

    pub fn has_pair(&self, pair: &str) -> bool {
        self.pairs.iter().any(|p| p == pair)
    }

    /// Draw one signal per pair and rank them by confidence, highest first.
    pub fn generate(&self, rng: &mut dyn RandomSource) -> Vec<Signal> {
        let mut signals: Vec<Signal> = self
            .pairs
            .iter()
            .map(|pair| Self::draw(pair, rng))
            .collect();

        // Stable sort: ties keep pair order.
        signals.sort_by(|a, b| b.confidence.cmp(&a.confidence));

        if let Some(top) = signals.first() {
            debug!(count = signals.len(), top = %top, "Signals regenerated");
        }
        signals
    }

    fn draw(pair: &str, rng: &mut dyn RandomSource) -> Signal {
        let direction = if rng.next_bool() {
            Direction::Buy
        } else {
            Direction::Sell
        };
        let confidence = draw_in(rng, &CONFIDENCE_RANGE);
        let volatility = draw_in(rng, &VOLATILITY_RANGE);
        let trend_idx = rng.next_in_range(0, (Trend::ALL.len() - 1) as u32) as usize;
        let trend = Trend::ALL[trend_idx.min(Trend::ALL.len() - 1)];

        Signal {
            pair: pair.to_string(),
            direction,
            confidence,
            volatility,
            trend,
        }
    }
}

/// Draw from `range`, clamping whatever the source returns back inside it.
fn draw_in(rng: &mut dyn RandomSource, range: &RangeInclusive<u8>) -> u8 {
    let (low, high) = (*range.start(), *range.end());
    let v = rng.next_in_range(u32::from(low), u32::from(high));
    v.clamp(u32::from(low), u32::from(high)) as u8
}
