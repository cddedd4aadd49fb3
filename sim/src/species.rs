//! Species catalog.
//!
//! Every animal belongs to one of a fixed set of species. Each species has a
//! base health, a score value awarded on a kill, and the tone of its call.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Damage dealt by a single rifle hit on the armored species.
const ARMORED_HIT_DAMAGE: f32 = 40.0;

/// Damage dealt by a single rifle hit on every other species.
const STANDARD_HIT_DAMAGE: f32 = 100.0;

/// Static tuning values for one species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesProfile {
    /// Health at spawn.
    pub health: f32,
    /// Score awarded when killed.
    pub score: u32,
    /// Call tone in Hz.
    pub call_frequency: f32,
}

/// Kind of animal.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Deer,
    Wolf,
    Bear,
    Rabbit,
}

impl Species {
    /// All species, in spawn order.
    pub const ALL: [Species; 4] = [Species::Deer, Species::Wolf, Species::Bear, Species::Rabbit];

    pub fn profile(self) -> SpeciesProfile {
        match self {
            Species::Deer => SpeciesProfile { health: 100.0, score: 50, call_frequency: 120.0 },
            Species::Wolf => SpeciesProfile { health: 80.0, score: 75, call_frequency: 400.0 },
            Species::Bear => SpeciesProfile { health: 300.0, score: 200, call_frequency: 80.0 },
            Species::Rabbit => SpeciesProfile { health: 20.0, score: 20, call_frequency: 800.0 },
        }
    }

    pub fn base_health(self) -> f32 {
        self.profile().health
    }

    pub fn score_value(self) -> u32 {
        self.profile().score
    }

    pub fn call_frequency(self) -> f32 {
        self.profile().call_frequency
    }

    /// The bear soaks rifle rounds; everything else drops to one hit.
    pub fn is_armored(self) -> bool {
        matches!(self, Species::Bear)
    }

    /// Damage a single rifle hit deals to this species.
    pub fn hit_damage(self) -> f32 {
        if self.is_armored() {
            ARMORED_HIT_DAMAGE
        } else {
            STANDARD_HIT_DAMAGE
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Species::Deer => "deer",
            Species::Wolf => "wolf",
            Species::Bear => "bear",
            Species::Rabbit => "rabbit",
        }
    }

    /// Stable numeric id used in flat instance buffers.
    pub fn index(self) -> u8 {
        match self {
            Species::Deer => 0,
            Species::Wolf => 1,
            Species::Bear => 2,
            Species::Rabbit => 3,
        }
    }
}
