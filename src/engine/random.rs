//! Injectable randomness.
//!
//! Every random draw in the engine goes through [`RandomSource`] so tests
//! can script exact outcomes and production can seed for reproducibility.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg_attr(test, mockall::automock)]
pub trait RandomSource: Send {
    /// Fair coin flip.
    fn next_bool(&mut self) -> bool;

    /// Uniform integer in `low..=high`.
    fn next_in_range(&mut self, low: u32, high: u32) -> u32;

    /// Uniform float in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

/// [`RandomSource`] backed by a standard seeded PRNG.
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when a seed is given, entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for StdRandom {
    fn next_bool(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn next_in_range(&mut self, low: u32, high: u32) -> u32 {
        self.rng.gen_range(low..=high)
    }

    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}
