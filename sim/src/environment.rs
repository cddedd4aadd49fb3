//! Weather and its effect on the senses and the rifle.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    Clear,
    Foggy,
    Rainy,
    Stormy,
}

impl Weather {
    pub const ALL: [Weather; 4] = [Weather::Clear, Weather::Foggy, Weather::Rainy, Weather::Stormy];

    /// Multiplier on animal sight range.
    pub fn sight_modifier(self) -> f32 {
        match self {
            Weather::Foggy => 0.4,
            Weather::Stormy => 0.35,
            Weather::Clear | Weather::Rainy => 1.0,
        }
    }

    /// Multiplier on animal hearing range.
    pub fn hearing_modifier(self) -> f32 {
        match self {
            Weather::Stormy => 0.4,
            _ => 1.0,
        }
    }

    /// Extra shot spread from wind and rain.
    pub fn shot_inaccuracy(self) -> f32 {
        match self {
            Weather::Stormy => 0.012,
            Weather::Rainy => 0.006,
            Weather::Clear | Weather::Foggy => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Weather::Clear => "clear",
            Weather::Foggy => "foggy",
            Weather::Rainy => "rainy",
            Weather::Stormy => "stormy",
        }
    }
}

/// Current weather and when the automatic cycle changes it next.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct WeatherState {
    pub current: Weather,
    /// `None` when cycling is off.
    pub next_change_ms: Option<u64>,
}

impl WeatherState {
    pub fn new(current: Weather, next_change_ms: Option<u64>) -> Self {
        Self { current, next_change_ms }
    }
}
