//! Deterministic simulation-scoped RNG.
//!
//! # Determinism strategy
//!
//! A run owns exactly one `SimRng`, seeded from `EvacConfig::seed`, and hands
//! `&mut SimRng` to every component that draws randomness: demographic
//! sampling, initial placement, the per-tick activation shuffle, exit queue
//! shuffles, softmax exit choice, and movement tie-breaks.  There is no
//! process-wide generator, so concurrent runs (parameter sweeps) never
//! interfere and the same config always reproduces the same exit-event log.
//!
//! Every draw happens on the single simulation thread in a fixed program
//! order, which is what makes a single stream sufficient.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Simulation-level RNG.
///
/// Each Engine owns one; sweep points build their own from their config
/// rather than sharing.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Draw from any `rand`/`rand_distr` distribution.
    #[inline]
    pub fn sample<T, D: Distribution<T>>(&mut self, dist: D) -> T {
        self.0.sample(dist)
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }

    /// Choose a random element from a non-empty slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }

    /// Pick an index with probability proportional to `weights[i]`.
    ///
    /// Returns `None` if `weights` is empty, contains a negative or
    /// non-finite value, or sums to zero.
    pub fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let dist = WeightedIndex::new(weights).ok()?;
        Some(dist.sample(&mut self.0))
    }
}
