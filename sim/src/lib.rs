//! Wildwood Hunt - Simulation Core
//!
//! A deterministic, fixed-timestep ECS simulation of a forest hunt: animal
//! behavior, perception of the hunter, rifle hit resolution, scent and blood
//! trails, and a self-replenishing population.
//! Uses `bevy_ecs` for the entity-component-system architecture.

pub mod api;
pub mod components;
pub mod config;
pub mod environment;
pub mod events;
pub mod guide;
pub mod instance_buffer;
pub mod player;
pub mod rng;
pub mod spatial;
pub mod species;
pub mod systems;
pub mod trails;
pub mod world;

pub use components::*;
pub use config::{ConfigError, HuntConfig};
pub use environment::{Weather, WeatherState};
pub use events::{EventBuffer, ShotBlocked, SimEvent};
pub use guide::{FieldGuide, GuideBackend, GuideError, OfflineGuide};
pub use player::{Motion, PlayerState, Posture};
pub use rng::SimRng;
pub use spatial::{ColliderEntry, ColliderRegistry, RayHit};
pub use species::Species;
pub use systems::*;
pub use trails::{BloodPoint, ScentPoint, TrailStore};
pub use world::{SessionState, Snapshot};
pub use api::{AnimalView, HuntSim};
