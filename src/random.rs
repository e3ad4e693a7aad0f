//! Randomness sources for the engine.
//!
//! Every probabilistic decision in a turn (accuracy, critical hits, damage
//! rolls, secondary effect chances, speed ties, fallback replacements) goes
//! through a [`RandomSource`], so battles can be replayed from a seed or
//! driven by a fixed script in tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource: Send {
    /// A uniform integer in `0..bound`. A bound of zero always yields zero.
    fn next_int(&mut self, bound: u32) -> u32;

    /// A uniform float in `[0, 1)`.
    fn next_float(&mut self) -> f64;

    /// Rolls a percentage gate. A chance of 100 or more always passes without
    /// consuming a roll.
    fn chance(&mut self, percent: u8) -> bool {
        if percent >= 100 {
            return true;
        }
        self.next_int(100) < percent as u32
    }
}

/// Production randomness backed by `StdRng`.
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_int(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.rng.random_range(0..bound)
    }

    fn next_float(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// A scripted source that cycles through a fixed list of values.
///
/// `next_int(bound)` returns `value % bound`; `next_float` maps the value
/// into `[0, 1)` as `(value % 1000) / 1000`. An empty script behaves as a
/// constant zero.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<u32>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, cursor: 0 }
    }

    /// A script that repeats a single value forever.
    pub fn constant(value: u32) -> Self {
        Self::new(vec![value])
    }

    fn next_raw(&mut self) -> u32 {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

impl RandomSource for ScriptedRandom {
    fn next_int(&mut self, bound: u32) -> u32 {
        let raw = self.next_raw();
        if bound == 0 {
            return 0;
        }
        raw % bound
    }

    fn next_float(&mut self) -> f64 {
        (self.next_raw() % 1000) as f64 / 1000.0
    }
}
