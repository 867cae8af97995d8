//! # Traffic Model Module
//!
//! The randomness seam of the simulator. Load values and worker placement
//! are the only nondeterministic inputs, and both are drawn through the
//! [`TrafficModel`] trait so that tests can substitute scripted sequences
//! for the seeded uniform generator used in normal operation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::config::{SimulatorConfig, DEFAULT_LOAD_MAX, DEFAULT_LOAD_MIN};

/// Source of connection loads and worker placements.
///
/// Implementations take `&mut self` because drawing advances generator
/// state; the dispatcher serializes access internally.
pub trait TrafficModel: Send {
    /// Load value for the next admitted connection, in the model's
    /// half-open load range.
    fn connection_load(&mut self) -> f64;

    /// Index of the worker that receives the next connection.
    ///
    /// `pool_size` is always at least 1; the returned index must be less
    /// than `pool_size`.
    fn pick_worker(&mut self, pool_size: usize) -> usize;
}

/// The production model: uniform draws from a seedable PRNG.
///
/// Loads are uniform over `[load_min, load_max)` and placement is uniform
/// over the pool, independent of per-worker load. Placement being blind to
/// load is the simulator's defining policy, not an omission.
pub struct UniformModel {
    rng: StdRng,
    load_min: f64,
    load_max: f64,
}

impl UniformModel {
    /// Model seeded from OS entropy.
    pub fn new(load_min: f64, load_max: f64) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            load_min,
            load_max,
        }
    }

    /// Model with a fixed seed; identical seeds produce identical draw
    /// sequences.
    pub fn seeded(seed: u64, load_min: f64, load_max: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            load_min,
            load_max,
        }
    }

    /// Model matching a configuration's load range and optional seed.
    pub fn from_config(config: &SimulatorConfig) -> Self {
        match config.seed {
            Some(seed) => Self::seeded(seed, config.load_min, config.load_max),
            None => Self::new(config.load_min, config.load_max),
        }
    }
}

impl Default for UniformModel {
    fn default() -> Self {
        Self::new(DEFAULT_LOAD_MIN, DEFAULT_LOAD_MAX)
    }
}

impl TrafficModel for UniformModel {
    fn connection_load(&mut self) -> f64 {
        self.rng.gen_range(self.load_min..self.load_max)
    }

    fn pick_worker(&mut self, pool_size: usize) -> usize {
        self.rng.gen_range(0..pool_size)
    }
}
