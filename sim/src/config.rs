//! Simulation tunables. Defaults reproduce the shipped game; a RON file can
//! override any subset of fields.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating a [`HuntConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Configuration resource for the hunt simulation.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HuntConfig {
    /// Fixed timestep in seconds (default 1/60).
    pub fixed_timestep: f32,
    /// Seed for the simulation RNG.
    pub rng_seed: u64,

    // --- World ---
    /// Half the side length of the playable square.
    pub world_half_size: f32,
    /// Fraction of the half-size beyond which animals are turned back.
    pub boundary_fraction: f32,
    /// Per-axis spread of the point animals are sent back to.
    pub boundary_return_spread: f32,
    /// Animals spawn within +-this on x and z.
    pub spawn_half_extent: f32,

    // --- Population ---
    pub animal_count: usize,
    pub respawn_delay_ms: u64,

    // --- Behavior ---
    pub reroll_min_ms: u64,
    pub reroll_max_ms: u64,
    pub idle_chance: f32,
    pub centroid_bias_chance: f32,
    pub centroid_pull: f32,
    pub wander_spread: f32,
    pub ambient_call_chance: f32,
    /// Calls farther than this from the hunter are not reported.
    pub call_audible_range: f32,

    // --- Perception ---
    pub perception_interval_ms: u64,
    pub sight_range: f32,
    pub scent_range: f32,
    pub hearing_range_running: f32,
    pub hearing_range_quiet: f32,
    /// Stamina below this counts as running for hearing.
    pub running_stamina_threshold: f32,
    pub flee_trigger_distance: f32,
    pub flee_run_distance: f32,

    // --- Movement ---
    pub arrive_radius: f32,
    pub movement_gain: f32,
    pub wounded_speed_factor: f32,
    pub heading_smoothing: f32,

    // --- Trails ---
    pub scent_interval_ms: u64,
    pub blood_interval_ms: u64,
    pub scent_max_age_ms: u64,
    pub blood_max_age_ms: u64,
    pub scent_capacity: usize,
    pub blood_capacity: usize,
    pub trail_sweep_interval_ms: u64,

    // --- Rifle ---
    pub magazine_size: u32,
    pub shot_cooldown_ms: u64,
    pub shot_range: f32,
    /// Distance a hit animal's target is pushed away from the impact.
    pub hit_flee_push: f32,
    pub collider_radius: f32,
    /// Height of the collider center above the animal's ground point.
    pub collider_height: f32,
    /// Cell size of the collider registry grid.
    pub collider_cell_size: f32,

    // --- Player ---
    pub stamina_drain: f32,
    pub stamina_regen: f32,

    // --- Weather ---
    pub weather_cycle: bool,
    pub first_weather_change_ms: u64,
    pub weather_min_interval_ms: u64,
    pub weather_max_interval_ms: u64,

    // --- Props ---
    pub prop_count: usize,
    pub prop_half_extent: f32,
    pub prop_break_radius: f32,

    // --- Host ---
    /// Most recent events kept for a host that has not drained yet.
    pub event_capacity: usize,
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            rng_seed: 0x5EED_F0E5,

            world_half_size: 250.0,
            boundary_fraction: 0.8,
            boundary_return_spread: 25.0,
            spawn_half_extent: 187.5,

            animal_count: 20,
            respawn_delay_ms: 20_000,

            reroll_min_ms: 5_000,
            reroll_max_ms: 8_000,
            idle_chance: 0.2,
            centroid_bias_chance: 0.6,
            centroid_pull: 15.0,
            wander_spread: 15.0,
            ambient_call_chance: 0.15,
            call_audible_range: 60.0,

            perception_interval_ms: 400,
            sight_range: 45.0,
            scent_range: 18.0,
            hearing_range_running: 38.0,
            hearing_range_quiet: 15.0,
            running_stamina_threshold: 90.0,
            flee_trigger_distance: 18.0,
            flee_run_distance: 50.0,

            arrive_radius: 1.5,
            movement_gain: 8.0,
            wounded_speed_factor: 0.55,
            heading_smoothing: 0.1,

            scent_interval_ms: 2_500,
            blood_interval_ms: 1_000,
            scent_max_age_ms: 30_000,
            blood_max_age_ms: 60_000,
            scent_capacity: 1_000,
            blood_capacity: 500,
            trail_sweep_interval_ms: 5_000,

            magazine_size: 10,
            shot_cooldown_ms: 350,
            shot_range: 400.0,
            hit_flee_push: 60.0,
            collider_radius: 0.8,
            collider_height: 0.4,
            collider_cell_size: 10.0,

            stamina_drain: 30.0,
            stamina_regen: 15.0,

            weather_cycle: true,
            first_weather_change_ms: 30_000,
            weather_min_interval_ms: 45_000,
            weather_max_interval_ms: 105_000,

            prop_count: 150,
            prop_half_extent: 225.0,
            prop_break_radius: 1.3,

            event_capacity: crate::events::DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl HuntConfig {
    /// Parse a config from RON text. Missing fields take their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: HuntConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_ron_str(&text)
    }

    /// Load a config file, falling back to defaults when it is missing or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {:?}, using defaults", path);
                Self::default()
            }
            Err(e) => {
                log::warn!("Invalid config at {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Serialize to pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Check ranges the systems rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid { field, reason: reason.into() }
        }

        if !(self.fixed_timestep > 0.0) {
            return Err(invalid("fixed_timestep", "must be positive"));
        }
        if !(self.world_half_size > 0.0) {
            return Err(invalid("world_half_size", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.boundary_fraction) {
            return Err(invalid("boundary_fraction", "must be within [0, 1]"));
        }
        if self.spawn_half_extent < 0.0 || self.spawn_half_extent > self.world_half_size {
            return Err(invalid("spawn_half_extent", "must lie inside the world"));
        }
        if self.reroll_min_ms > self.reroll_max_ms {
            return Err(invalid("reroll_min_ms", "must not exceed reroll_max_ms"));
        }
        if self.weather_min_interval_ms > self.weather_max_interval_ms {
            return Err(invalid("weather_min_interval_ms", "must not exceed weather_max_interval_ms"));
        }
        for (field, p) in [
            ("idle_chance", self.idle_chance),
            ("centroid_bias_chance", self.centroid_bias_chance),
            ("ambient_call_chance", self.ambient_call_chance),
            ("wounded_speed_factor", self.wounded_speed_factor),
            ("heading_smoothing", self.heading_smoothing),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(field, "must be within [0, 1]"));
            }
        }
        if self.perception_interval_ms == 0 {
            return Err(invalid("perception_interval_ms", "must be non-zero"));
        }
        if self.scent_capacity == 0 || self.blood_capacity == 0 {
            return Err(invalid("scent_capacity", "trail capacities must be non-zero"));
        }
        if self.event_capacity == 0 {
            return Err(invalid("event_capacity", "must be non-zero"));
        }
        if !(self.collider_radius > 0.0) {
            return Err(invalid("collider_radius", "must be positive"));
        }
        if self.collider_cell_size <= self.collider_radius {
            return Err(invalid("collider_cell_size", "must exceed collider_radius"));
        }
        if !(self.shot_range > 0.0) {
            return Err(invalid("shot_range", "must be positive"));
        }
        Ok(())
    }

    /// Radius beyond which the boundary correction kicks in.
    pub fn boundary_radius(&self) -> f32 {
        self.world_half_size * self.boundary_fraction
    }
}
