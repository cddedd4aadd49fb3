//! Seeded simulation RNG.

use bevy_ecs::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f32::consts::TAU;

/// The single source of randomness for every system. Seeded from config so
/// a session replays identically.
#[derive(Resource, Debug, Clone)]
pub struct SimRng(pub ChaCha8Rng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Uniform in `[-spread, spread]`.
    pub fn offset(&mut self, spread: f32) -> f32 {
        if spread <= 0.0 {
            return 0.0;
        }
        self.0.gen_range(-spread..=spread)
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f32) -> bool {
        self.0.gen::<f32>() < p
    }

    /// Uniform in `[min, max]` milliseconds.
    pub fn delay_ms(&mut self, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }
        self.0.gen_range(min..=max)
    }

    /// Random yaw in `[0, TAU)`.
    pub fn heading(&mut self) -> f32 {
        self.0.gen_range(0.0..TAU)
    }

    /// Uniform point in the square `[-extent, extent]^2`.
    pub fn ground_point(&mut self, extent: f32) -> (f32, f32) {
        (self.offset(extent), self.offset(extent))
    }

    /// Uniform in `[0, 1)`.
    pub fn unit(&mut self) -> f32 {
        self.0.gen()
    }

    pub fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            None
        } else {
            Some(items[self.0.gen_range(0..items.len())])
        }
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::seeded(0)
    }
}
