//! C8: a reproducible uniform random source for initial particle state.
//!
//! Wraps [`rand::rngs::StdRng`] so callers get a portable, seedable PRNG
//! (`StdRng` is guaranteed reproducible across platforms for a fixed
//! seed, unlike `rand::thread_rng`) rather than rolling bespoke uniform
//! sampling.

use crate::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A seedable source of uniform samples used to initialize particle
/// position/velocity/radius state.
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// Creates a source seeded with `seed`, deterministic for a given seed.
    pub fn new(seed: u64) -> Self {
        RandomSource {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Re-seeds the source in place. Exposed so tests can reset determinism
    /// mid-run without constructing a new `Simulation`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Uniform scalar in `[lo, hi)`.
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        self.rng.gen_range(lo..hi)
    }

    /// Uniform point with each component independently in `[lo, hi)`.
    pub fn uniform_vec3(&mut self, lo: f64, hi: f64) -> Vector3 {
        Vector3::new(
            self.uniform(lo, hi),
            self.uniform(lo, hi),
            self.uniform(lo, hi),
        )
    }

    /// Uniform point with each component independently in its own `[lo, hi)` range.
    pub fn uniform_vec3_in(&mut self, lo: Vector3, hi: Vector3) -> Vector3 {
        Vector3::new(
            self.uniform(lo.x, hi.x),
            self.uniform(lo.y, hi.y),
            self.uniform(lo.z, hi.z),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_reproduces_sequence() {
        let mut a = RandomSource::new(42);
        let mut b = RandomSource::new(42);
        for _ in 0..100 {
            assert_eq!(a.uniform(-1.0, 1.0), b.uniform(-1.0, 1.0));
        }
    }

    #[test]
    fn reseed_restarts_sequence() {
        let mut a = RandomSource::new(7);
        let first: Vec<f64> = (0..10).map(|_| a.uniform(0.0, 1.0)).collect();
        a.reseed(7);
        let second: Vec<f64> = (0..10).map(|_| a.uniform(0.0, 1.0)).collect();
        assert_eq!(first, second);
    }
}
