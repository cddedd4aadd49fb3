//! Population manager.
//!
//! Owns the live set, the hunt tally and the respawn queue:
//!
//! - a kill removes the animal from the live set at once; its carcass stays
//!   in the world until the replacement spawns
//! - the replacement is a queued entry keyed by species and spawn slot,
//!   processed by [`respawn_system`] once its fire time arrives
//! - [`centroid_snapshot_system`] publishes the per-species mean position
//!   of living animals for the wander bias

use crate::components::*;
use crate::config::HuntConfig;
use crate::events::{EventBuffer, SimEvent};
use crate::rng::SimRng;
use crate::spatial::{collider_center, ColliderRegistry};
use crate::species::Species;
use crate::systems::clock::SimClock;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One entry in the hunt log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HuntRecord {
    pub id: u64,
    pub species: Species,
    pub timestamp_ms: u64,
    /// Ground distance from the hunter at the moment of the kill.
    pub distance: f32,
    pub score: u32,
}

/// Live set and running totals.
#[derive(Resource, Debug, Default)]
pub struct PopulationState {
    next_id: u64,
    next_slot: u32,
    live: BTreeMap<AnimalId, Entity>,
    pub score: u32,
    pub kills: u32,
    hunt_log: Vec<HuntRecord>,
}

impl PopulationState {
    /// Hand out the next animal id. Ids are never reused.
    pub fn allocate_id(&mut self) -> AnimalId {
        self.next_id += 1;
        AnimalId(self.next_id)
    }

    pub fn allocate_slot(&mut self) -> SpawnSlot {
        let slot = SpawnSlot(self.next_slot);
        self.next_slot += 1;
        slot
    }

    /// Add a freshly spawned animal to the live set.
    pub fn register(&mut self, id: AnimalId, entity: Entity) {
        let previous = self.live.insert(id, entity);
        debug_assert!(previous.is_none(), "animal id {} registered twice", id.0);
    }

    /// Remove a killed animal and tally the hunt. Returns `None` if the
    /// animal had already left the live set, so a kill is counted once.
    pub fn record_kill(
        &mut self,
        id: AnimalId,
        species: Species,
        timestamp_ms: u64,
        distance: f32,
    ) -> Option<HuntRecord> {
        self.live.remove(&id)?;
        let record = HuntRecord {
            id: id.0,
            species,
            timestamp_ms,
            distance,
            score: species.score_value(),
        };
        self.score += record.score;
        self.kills += 1;
        self.hunt_log.push(record);
        Some(record)
    }

    pub fn is_live(&self, id: AnimalId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn entity(&self, id: AnimalId) -> Option<Entity> {
        self.live.get(&id).copied()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live_ids(&self) -> impl Iterator<Item = AnimalId> + '_ {
        self.live.keys().copied()
    }

    /// Kills in the order they happened.
    pub fn hunt_log(&self) -> &[HuntRecord] {
        &self.hunt_log
    }
}

/// A replacement waiting to spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RespawnEntry {
    pub species: Species,
    pub slot: SpawnSlot,
    pub fire_at_ms: u64,
    /// Carcass removed when the replacement spawns.
    pub carcass: Option<Entity>,
}

/// Scheduled respawns, drained once per tick.
#[derive(Resource, Debug, Default)]
pub struct RespawnQueue {
    entries: Vec<RespawnEntry>,
}

impl RespawnQueue {
    pub fn schedule(&mut self, entry: RespawnEntry) {
        self.entries.push(entry);
    }

    /// Remove and return every entry due at `now_ms`, earliest first.
    pub fn take_due(&mut self, now_ms: u64) -> Vec<RespawnEntry> {
        let mut due = Vec::new();
        self.entries.retain(|entry| {
            if entry.fire_at_ms <= now_ms {
                due.push(*entry);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|e| (e.fire_at_ms, e.slot.0));
        due
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.fire_at_ms).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-species mean ground position of living animals, rebuilt every tick.
#[derive(Resource, Debug, Default, Clone)]
pub struct GroupCentroids(HashMap<Species, (f32, f32)>);

impl GroupCentroids {
    pub fn get(&self, species: Species) -> Option<(f32, f32)> {
        self.0.get(&species).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Species and slot for each initial animal: `total / 4` of each species.
pub fn spawn_quota(total: usize) -> Vec<(Species, SpawnSlot)> {
    let per_species = total / Species::ALL.len();
    let mut quota = Vec::with_capacity(per_species * Species::ALL.len());
    for species in Species::ALL {
        for _ in 0..per_species {
            quota.push((species, SpawnSlot(quota.len() as u32)));
        }
    }
    quota
}

/// Build a fresh animal at a random spawn point.
pub fn roll_animal(
    population: &mut PopulationState,
    rng: &mut SimRng,
    config: &HuntConfig,
    species: Species,
    slot: SpawnSlot,
    now_ms: u64,
) -> AnimalBundle {
    let (x, z) = rng.ground_point(config.spawn_half_extent);
    place_animal(population, rng, config, species, slot, x, z, now_ms)
}

/// Build a fresh animal at a given ground point.
#[allow(clippy::too_many_arguments)]
pub fn place_animal(
    population: &mut PopulationState,
    rng: &mut SimRng,
    config: &HuntConfig,
    species: Species,
    slot: SpawnSlot,
    x: f32,
    z: f32,
    now_ms: u64,
) -> AnimalBundle {
    let id = population.allocate_id();
    let heading = rng.heading();
    let next_reroll = now_ms + rng.delay_ms(config.reroll_min_ms, config.reroll_max_ms);
    AnimalBundle::new(id, species, slot, x, z, heading, next_reroll)
}

/// System that publishes the per-species centroid of living animals.
pub fn centroid_snapshot_system(
    mut centroids: ResMut<GroupCentroids>,
    query: Query<(&Species, &Position, &Health)>,
) {
    let mut sums: HashMap<Species, (f32, f32, u32)> = HashMap::new();
    for (species, pos, health) in query.iter() {
        if !health.is_alive() {
            continue;
        }
        let sum = sums.entry(*species).or_insert((0.0, 0.0, 0));
        sum.0 += pos.x;
        sum.1 += pos.z;
        sum.2 += 1;
    }

    centroids.0 = sums
        .into_iter()
        .map(|(species, (x, z, n))| (species, (x / n as f32, z / n as f32)))
        .collect();
}

/// System that spawns due replacements and clears their carcasses.
///
/// ## Data Access
/// - Reads: SimClock, HuntConfig
/// - Writes: SimRng, PopulationState, RespawnQueue, ColliderRegistry, EventBuffer
#[allow(clippy::too_many_arguments)]
pub fn respawn_system(
    mut commands: Commands,
    clock: Res<SimClock>,
    config: Res<HuntConfig>,
    mut rng: ResMut<SimRng>,
    mut population: ResMut<PopulationState>,
    mut queue: ResMut<RespawnQueue>,
    mut registry: ResMut<ColliderRegistry>,
    mut events: ResMut<EventBuffer>,
) {
    let now = clock.now_ms();
    for entry in queue.take_due(now) {
        if let Some(carcass) = entry.carcass {
            if let Some(mut carcass_commands) = commands.get_entity(carcass) {
                carcass_commands.despawn();
            }
        }

        let bundle = roll_animal(&mut population, &mut rng, &config, entry.species, entry.slot, now);
        let id = bundle.id;
        let pos = bundle.position;
        let entity = commands.spawn(bundle).id();

        population.register(id, entity);
        registry.insert(entity, collider_center(&pos, &config), config.collider_radius);

        log::info!(
            "Respawned {} {} in slot {} at ({:.1}, {:.1})",
            entry.species.as_str(),
            id.0,
            entry.slot.0,
            pos.x,
            pos.z
        );
        events.push(SimEvent::AnimalRespawned {
            id: id.0,
            species: entry.species,
            x: pos.x,
            z: pos.z,
        });
    }
}
