//! Session state and snapshot types.
//!
//! The `Snapshot` struct provides a serializable, read-only view of the
//! simulation that a renderer or UI can consume each frame.

use crate::components::*;
use crate::environment::{Weather, WeatherState};
use crate::player::{Posture, PlayerState};
use crate::species::Species;
use crate::systems::clock::SimClock;
use crate::systems::population::{HuntRecord, PopulationState};
use crate::trails::{TrailStore, BLOOD_HEIGHT, SCENT_HEIGHT};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle of a hunting session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Menu,
    Playing,
    Paused,
    Over,
}

/// Snapshot of a single animal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimalSnapshot {
    pub id: u64,
    pub species: Species,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub heading: f32,
    pub health: f32,
    pub health_max: f32,
    pub behavior: BehaviorState,
    pub is_dead: bool,
    pub is_wounded: bool,
    /// Render scale; wounded animals pulse.
    pub scale: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScentSnapshot {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub species: Species,
    /// Remaining life in `[0, 1]`.
    pub life: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodSnapshot {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub life: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropSnapshot {
    pub kind: PropKind,
    pub state: PropState,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub yaw: f32,
    pub scale: f32,
}

/// Complete simulation state snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current simulation tick.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub time: f32,
    pub session: SessionState,
    pub weather: Weather,
    pub score: u32,
    pub kills: u32,
    pub live_count: usize,
    pub ammo: u32,
    pub stamina: f32,
    pub posture: Posture,
    pub aiming: bool,
    pub tracker_vision: bool,
    pub animals: Vec<AnimalSnapshot>,
    pub scent: Vec<ScentSnapshot>,
    pub blood: Vec<BloodSnapshot>,
    /// Props still visible (intact or shattering).
    pub props: Vec<PropSnapshot>,
    pub hunt_log: Vec<HuntRecord>,
}

/// Scale pulse for wounded animals.
pub fn wound_pulse(t: f32) -> f32 {
    1.0 + ((t * 6.0).sin() + 1.0) * 0.1
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World, session: SessionState) -> Self {
        let clock = world.get_resource::<SimClock>().copied().unwrap_or_default();
        let now = clock.now_ms();
        let t = clock.seconds();

        let mut animals = Vec::new();
        let mut query = world.query::<(
            &AnimalId,
            &Species,
            &Position,
            &Heading,
            &Health,
            &BehaviorState,
        )>();
        for (id, species, pos, heading, health, state) in query.iter(world) {
            let is_wounded = health.is_wounded();
            animals.push(AnimalSnapshot {
                id: id.0,
                species: *species,
                x: pos.x,
                y: pos.y,
                z: pos.z,
                heading: heading.0,
                health: health.current,
                health_max: health.max,
                behavior: *state,
                is_dead: health.is_dead(),
                is_wounded,
                scale: if is_wounded { wound_pulse(t) } else { 1.0 },
            });
        }
        animals.sort_by_key(|a| a.id);

        let mut props = Vec::new();
        let mut prop_query = world.query::<(&PropKind, &Position, &PropState, &PropMotion)>();
        for (kind, pos, state, motion) in prop_query.iter(world) {
            if *state == PropState::Gone {
                continue;
            }
            props.push(PropSnapshot {
                kind: *kind,
                state: *state,
                x: pos.x,
                y: pos.y,
                z: pos.z,
                yaw: motion.yaw,
                scale: motion.current_scale(),
            });
        }

        let mut snapshot = Self {
            tick: clock.tick,
            time: t,
            session,
            animals,
            props,
            ..Default::default()
        };

        if let Some(trails) = world.get_resource::<TrailStore>() {
            snapshot.scent = trails
                .scent()
                .map(|p| ScentSnapshot {
                    x: p.x,
                    y: SCENT_HEIGHT,
                    z: p.z,
                    species: p.species,
                    life: trails.scent_life(p, now),
                })
                .collect();
            snapshot.blood = trails
                .blood()
                .map(|p| BloodSnapshot {
                    x: p.x,
                    y: BLOOD_HEIGHT,
                    z: p.z,
                    life: trails.blood_life(p, now),
                })
                .collect();
        }

        if let Some(weather) = world.get_resource::<WeatherState>() {
            snapshot.weather = weather.current;
        }

        if let Some(player) = world.get_resource::<PlayerState>() {
            snapshot.ammo = player.ammo;
            snapshot.stamina = player.stamina;
            snapshot.posture = player.posture;
            snapshot.aiming = player.aiming;
            snapshot.tracker_vision = player.tracker_vision;
        }

        if let Some(population) = world.get_resource::<PopulationState>() {
            snapshot.score = population.score;
            snapshot.kills = population.kills;
            snapshot.live_count = population.live_count();
            snapshot.hunt_log = population.hunt_log().to_vec();
        }

        snapshot
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reads_world() {
        let mut world = World::new();
        world.insert_resource(SimClock::at_ms(2_000));
        world.insert_resource(TrailStore::default());
        world.insert_resource(WeatherState::new(Weather::Rainy, None));

        let mut wounded = AnimalBundle::new(AnimalId(2), Species::Bear, SpawnSlot(1), 3.0, 4.0, 0.0, 0);
        wounded.health.damage(40.0);
        world.spawn(wounded);
        world.spawn(AnimalBundle::new(AnimalId(1), Species::Deer, SpawnSlot(0), 0.0, 0.0, 0.0, 0));
        let mut gone = PropBundle::new(PropKind::Rock, 0.0, 0.0, 1.0, 0.0);
        gone.state = PropState::Gone;
        world.spawn(gone);
        world.spawn(PropBundle::new(PropKind::Branch, 9.0, 9.0, 1.0, 0.0));
        world.resource_mut::<TrailStore>().add_blood(3.0, 4.0, 1_000);

        let snapshot = Snapshot::from_world(&mut world, SessionState::Playing);

        assert_eq!(snapshot.weather, Weather::Rainy);
        assert_eq!(snapshot.animals.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2]);
        let bear = &snapshot.animals[1];
        assert!(bear.is_wounded && !bear.is_dead);
        assert!(bear.scale >= 1.0 && bear.scale <= 1.2);
        assert_eq!(snapshot.animals[0].scale, 1.0);
        assert_eq!(snapshot.props.len(), 1);
        assert_eq!(snapshot.blood.len(), 1);
        assert_eq!(snapshot.blood[0].y, BLOOD_HEIGHT);
    }

    #[test]
    fn test_snapshot_json_names() {
        let snapshot = Snapshot::from_world(&mut World::new(), SessionState::Menu);
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"session\":\"menu\""));
        assert!(json.contains("\"weather\":\"clear\""));
    }
}
