//! Scent and blood trail store.
//!
//! Two append-only point sets. Each keeps only its most recent N points and
//! a periodic sweep drops points past their maximum age. Both bounds apply
//! independently.

use crate::config::HuntConfig;
use crate::species::Species;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Render height of scent points.
pub const SCENT_HEIGHT: f32 = 0.0;
/// Render height of blood points, just above the ground to avoid z-fighting.
pub const BLOOD_HEIGHT: f32 = 0.02;

/// A scent mark left by a moving animal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScentPoint {
    pub x: f32,
    pub z: f32,
    pub species: Species,
    pub timestamp_ms: u64,
}

/// A blood drop left by a wounded animal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloodPoint {
    pub x: f32,
    pub z: f32,
    pub timestamp_ms: u64,
}

/// Resource holding every live trail point.
#[derive(Resource, Debug, Clone)]
pub struct TrailStore {
    scent: VecDeque<ScentPoint>,
    blood: VecDeque<BloodPoint>,
    scent_capacity: usize,
    blood_capacity: usize,
    scent_max_age_ms: u64,
    blood_max_age_ms: u64,
    /// Time of the last age sweep.
    pub last_sweep_ms: u64,
}

impl TrailStore {
    pub fn new(
        scent_capacity: usize,
        blood_capacity: usize,
        scent_max_age_ms: u64,
        blood_max_age_ms: u64,
    ) -> Self {
        Self {
            scent: VecDeque::with_capacity(scent_capacity),
            blood: VecDeque::with_capacity(blood_capacity),
            scent_capacity,
            blood_capacity,
            scent_max_age_ms,
            blood_max_age_ms,
            last_sweep_ms: 0,
        }
    }

    pub fn from_config(config: &HuntConfig) -> Self {
        Self::new(
            config.scent_capacity,
            config.blood_capacity,
            config.scent_max_age_ms,
            config.blood_max_age_ms,
        )
    }

    /// Append a scent point, evicting the oldest when full.
    pub fn add_scent(&mut self, x: f32, z: f32, species: Species, timestamp_ms: u64) {
        if self.scent.len() >= self.scent_capacity {
            self.scent.pop_front();
        }
        self.scent.push_back(ScentPoint { x, z, species, timestamp_ms });
    }

    /// Append a blood point, evicting the oldest when full.
    pub fn add_blood(&mut self, x: f32, z: f32, timestamp_ms: u64) {
        if self.blood.len() >= self.blood_capacity {
            self.blood.pop_front();
        }
        self.blood.push_back(BloodPoint { x, z, timestamp_ms });
    }

    /// Drop every point at or past its maximum age. Returns how many went.
    ///
    /// Points are only ever appended with non-decreasing timestamps, so the
    /// expired ones always sit at the front.
    pub fn sweep(&mut self, now_ms: u64) -> usize {
        let before = self.scent.len() + self.blood.len();
        let scent_age = self.scent_max_age_ms;
        let blood_age = self.blood_max_age_ms;
        self.scent.retain(|p| now_ms.saturating_sub(p.timestamp_ms) < scent_age);
        self.blood.retain(|p| now_ms.saturating_sub(p.timestamp_ms) < blood_age);
        self.last_sweep_ms = now_ms;
        before - (self.scent.len() + self.blood.len())
    }

    pub fn scent(&self) -> impl Iterator<Item = &ScentPoint> {
        self.scent.iter()
    }

    pub fn blood(&self) -> impl Iterator<Item = &BloodPoint> {
        self.blood.iter()
    }

    pub fn scent_len(&self) -> usize {
        self.scent.len()
    }

    pub fn blood_len(&self) -> usize {
        self.blood.len()
    }

    /// Remaining life of a scent point in `[0, 1]`.
    pub fn scent_life(&self, point: &ScentPoint, now_ms: u64) -> f32 {
        life_fraction(point.timestamp_ms, now_ms, self.scent_max_age_ms)
    }

    /// Remaining life of a blood point in `[0, 1]`.
    pub fn blood_life(&self, point: &BloodPoint, now_ms: u64) -> f32 {
        life_fraction(point.timestamp_ms, now_ms, self.blood_max_age_ms)
    }
}

impl Default for TrailStore {
    fn default() -> Self {
        Self::from_config(&HuntConfig::default())
    }
}

fn life_fraction(timestamp_ms: u64, now_ms: u64, max_age_ms: u64) -> f32 {
    if max_age_ms == 0 {
        return 0.0;
    }
    let age = now_ms.saturating_sub(timestamp_ms) as f32;
    (1.0 - age / max_age_ms as f32).clamp(0.0, 1.0)
}
