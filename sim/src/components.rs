//! ECS Components for the Wildwood Hunt simulation.
//!
//! Components are pure data containers attached to entities.
//! All game logic lives in systems that query these components.

use crate::species::Species;
use bevy_ecs::prelude::*;
use glam::Vec3;
use serde::{Deserialize, Serialize};

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// Position in the forest. `x` and `z` span the ground plane, `y` is height.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn on_ground(x: f32, z: f32) -> Self {
        Self { x, y: 0.0, z }
    }

    /// Distance to a ground point, ignoring height.
    pub fn ground_distance_to(&self, x: f32, z: f32) -> f32 {
        let dx = self.x - x;
        let dz = self.z - z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Ground distance from the world center.
    pub fn distance_from_center(&self) -> f32 {
        self.ground_distance_to(0.0, 0.0)
    }

    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Facing angle around the vertical axis, in radians.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Heading(pub f32);

/// Ground point the behavior controller is steering toward.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveTarget {
    pub x: f32,
    pub z: f32,
}

impl MoveTarget {
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }
}

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Unique identifier for an animal. Never reused, not even by respawns.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimalId(pub u64);

/// Population slot an animal occupies. A replacement inherits the slot.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnSlot(pub u32);

// ============================================================================
// HEALTH
// ============================================================================

/// Health of an animal. `max` is the health this instance spawned with.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn is_dead(&self) -> bool {
        !self.is_alive()
    }

    /// Alive but below spawn health.
    pub fn is_wounded(&self) -> bool {
        self.is_alive() && self.current < self.max
    }

    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

// ============================================================================
// BEHAVIOR COMPONENTS
// ============================================================================

/// Behavior state of an animal.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorState {
    /// Standing still.
    Idle,
    /// Roaming toward a target point.
    #[default]
    Wander,
    /// Noticed the hunter; holds position.
    Alert,
    /// Running away. Only death ends it.
    Flee,
}

impl BehaviorState {
    /// Per-tick lerp speed before the delta-time gain is applied.
    pub fn move_speed(self) -> f32 {
        match self {
            BehaviorState::Flee => 0.22,
            BehaviorState::Wander => 0.045,
            BehaviorState::Alert | BehaviorState::Idle => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BehaviorState::Idle => "idle",
            BehaviorState::Wander => "wander",
            BehaviorState::Alert => "alert",
            BehaviorState::Flee => "flee",
        }
    }

    /// Stable numeric id used in flat instance buffers.
    pub fn index(self) -> u8 {
        match self {
            BehaviorState::Idle => 0,
            BehaviorState::Wander => 1,
            BehaviorState::Alert => 2,
            BehaviorState::Flee => 3,
        }
    }
}

/// Per-animal timers, all in simulation milliseconds.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BehaviorClock {
    /// When the idle/wander re-roll fires next.
    pub next_reroll_ms: u64,
    pub last_perception_ms: Option<u64>,
    pub last_scent_ms: Option<u64>,
    pub last_blood_ms: Option<u64>,
}

impl BehaviorClock {
    pub fn new(next_reroll_ms: u64) -> Self {
        Self {
            next_reroll_ms,
            ..Default::default()
        }
    }

    pub fn reroll_due(&self, now_ms: u64) -> bool {
        now_ms >= self.next_reroll_ms
    }

    pub fn perception_due(&self, now_ms: u64, interval_ms: u64) -> bool {
        elapsed_at_least(self.last_perception_ms, now_ms, interval_ms)
    }

    pub fn scent_due(&self, now_ms: u64, interval_ms: u64) -> bool {
        elapsed_at_least(self.last_scent_ms, now_ms, interval_ms)
    }

    pub fn blood_due(&self, now_ms: u64, interval_ms: u64) -> bool {
        elapsed_at_least(self.last_blood_ms, now_ms, interval_ms)
    }
}

#[inline]
fn elapsed_at_least(last: Option<u64>, now_ms: u64, interval_ms: u64) -> bool {
    match last {
        None => true,
        Some(t) => now_ms.saturating_sub(t) >= interval_ms,
    }
}

// ============================================================================
// PROP COMPONENTS
// ============================================================================

/// Kind of destructible ground clutter.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropKind {
    Rock,
    Branch,
}

/// Lifecycle of a prop.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropState {
    #[default]
    Intact,
    /// Stepped on; pieces are flying and fading.
    Shattering,
    Gone,
}

/// Shatter physics state.
#[derive(Component, Debug, Clone, Copy)]
pub struct PropMotion {
    pub velocity: Vec3,
    /// 1.0 when intact, fades to 0.0 while shattering.
    pub life: f32,
    pub scale: f32,
    pub yaw: f32,
}

impl PropMotion {
    pub fn new(scale: f32, yaw: f32) -> Self {
        Self {
            velocity: Vec3::ZERO,
            life: 1.0,
            scale,
            yaw,
        }
    }

    pub fn current_scale(&self) -> f32 {
        self.scale * self.life.max(0.0)
    }
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning a complete animal entity.
#[derive(Bundle)]
pub struct AnimalBundle {
    pub id: AnimalId,
    pub species: Species,
    pub slot: SpawnSlot,
    pub position: Position,
    pub heading: Heading,
    pub target: MoveTarget,
    pub health: Health,
    pub state: BehaviorState,
    pub clock: BehaviorClock,
}

impl AnimalBundle {
    /// A fresh animal at full health, wandering, with its target on itself.
    pub fn new(
        id: AnimalId,
        species: Species,
        slot: SpawnSlot,
        x: f32,
        z: f32,
        heading: f32,
        next_reroll_ms: u64,
    ) -> Self {
        Self {
            id,
            species,
            slot,
            position: Position::on_ground(x, z),
            heading: Heading(heading),
            target: MoveTarget::new(x, z),
            health: Health::new(species.base_health()),
            state: BehaviorState::Wander,
            clock: BehaviorClock::new(next_reroll_ms),
        }
    }
}

/// Bundle for spawning a destructible prop.
#[derive(Bundle)]
pub struct PropBundle {
    pub kind: PropKind,
    pub position: Position,
    pub state: PropState,
    pub motion: PropMotion,
}

impl PropBundle {
    pub fn new(kind: PropKind, x: f32, z: f32, scale: f32, yaw: f32) -> Self {
        Self {
            kind,
            position: Position::new(x, 0.1, z),
            state: PropState::Intact,
            motion: PropMotion::new(scale, yaw),
        }
    }
}
