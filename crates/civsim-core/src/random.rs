//! Injectable randomness for relation drift.
//!
//! The director takes exactly one draw in `[0, 1)` per ordered faction pair
//! per turn. Routing every draw through [`RandomSource`] makes whole runs
//! reproducible from a seed, and lets tests script the outcome of each draw.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    /// The next draw.
    fn next_f64(&mut self) -> f64;
}

/// Seeded pseudo-random draws. The same seed yields the same sequence.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: SmallRng,
}

impl SeededRandom {
    /// A generator seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// A fixed list of draws, replayed in order and cycled when exhausted.
///
/// An empty script always draws `0.0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    draws: Vec<f64>,
    taken: usize,
}

impl ScriptedRandom {
    /// Replay `draws` in order.
    pub const fn new(draws: Vec<f64>) -> Self {
        Self { draws, taken: 0 }
    }

    /// A script whose draws never fall below any transition probability.
    pub fn never() -> Self {
        Self::new(vec![0.999_999])
    }

    /// A script whose draws fall below every non-zero probability.
    pub fn always() -> Self {
        Self::new(vec![0.0])
    }

    /// Number of draws taken so far.
    pub const fn taken(&self) -> usize {
        self.taken
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        let draw = self
            .draws
            .get(self.taken.checked_rem(self.draws.len()).unwrap_or(0))
            .copied()
            .unwrap_or(0.0);
        self.taken = self.taken.saturating_add(1);
        draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_draws() {
        let mut a = SeededRandom::new(7);
        let mut b = SeededRandom::new(7);
        for _ in 0..32 {
            let draw = a.next_f64();
            assert!((0.0..1.0).contains(&draw));
            assert!((draw - b.next_f64()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn script_cycles_and_counts() {
        let mut script = ScriptedRandom::new(vec![0.1, 0.9]);
        let draws: Vec<f64> = (0..5).map(|_| script.next_f64()).collect();
        assert_eq!(draws.len(), 5);
        assert!((draws[2] - 0.1).abs() < f64::EPSILON);
        assert!((draws[3] - 0.9).abs() < f64::EPSILON);
        assert_eq!(script.taken(), 5);
    }

    #[test]
    fn empty_script_draws_zero() {
        let mut script = ScriptedRandom::default();
        assert!(script.next_f64().abs() < f64::EPSILON);
    }
}
