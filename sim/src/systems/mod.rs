//! ECS Systems for the Wildwood Hunt simulation.
//!
//! Systems contain the game logic that operates on components.
//!
//! ## Tick Order
//!
//! One fixed update runs these groups in order, each chained internally:
//!
//! **Group 1 (World upkeep)**:
//! - `stamina_system` - Drains or regenerates hunter stamina
//! - `weather_cycle_system` - Rolls the next weather when due
//! - `respawn_system` - Spawns due replacements, clears carcasses
//! - `centroid_snapshot_system` - Publishes per-species centroids
//!
//! **Group 2 (Decisions)** - after centroids:
//! - `behavior_timer_system` - Idle/wander re-rolls, boundary correction, ambient calls
//! - `perception_system` - Alert/flee escalation
//! - `shot_system` - Hit resolution, kills, respawn scheduling
//!
//! **Group 3 (Motion and marks)** - after shots:
//! - `movement_system` - Moves animals toward targets
//! - `collider_sync_system` - Moves registered colliders with their animals
//! - `trail_emission_system` - Drops scent and blood
//! - `trail_sweep_system` - Ages out old trail points
//! - `prop_system` - Breaks and animates props

pub mod behavior;
pub mod clock;
pub mod combat;
pub mod emission;
pub mod movement;
pub mod perception;
pub mod population;
pub mod props;
pub mod serialization;
pub mod stamina;
pub mod weather;

pub use behavior::*;
pub use clock::*;
pub use combat::*;
pub use emission::*;
pub use movement::*;
pub use perception::*;
pub use population::*;
pub use props::*;
pub use serialization::*;
pub use stamina::*;
pub use weather::*;
