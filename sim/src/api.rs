//! Public API for the simulation.
//!
//! This module provides the main interface for a render loop (or any other
//! host) to drive a hunt: start a session, push hunter input, step time and
//! read snapshots, instance buffers and events back out.
//!
//! ## Fixed Timestep
//!
//! The simulation uses a fixed timestep internally (default 60 Hz). When `step(dt)` is called,
//! the simulation accumulates time and runs fixed updates as needed. This ensures deterministic
//! behavior regardless of frame rate. Time only advances while a session is playing.

use crate::components::*;
use crate::config::HuntConfig;
use crate::environment::{Weather, WeatherState};
use crate::events::{EventBuffer, SimEvent};
use crate::instance_buffer;
use crate::player::{Motion, PlayerState, Posture};
use crate::rng::SimRng;
use crate::spatial::{collider_center, collider_sync_system, ColliderRegistry};
use crate::species::Species;
use crate::systems::*;
use crate::trails::TrailStore;
use crate::world::{SessionState, Snapshot};
use bevy_ecs::prelude::*;
use glam::Vec3;

/// Read-only view of one animal, for hosts and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimalView {
    pub id: AnimalId,
    pub species: Species,
    pub position: Position,
    pub target: MoveTarget,
    pub health: f32,
    pub health_max: f32,
    pub state: BehaviorState,
    pub alive: bool,
}

/// The main simulation container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Starting, pausing and ending sessions
/// - Stepping the simulation forward
/// - Pushing hunter input
/// - Extracting state snapshots and events
pub struct HuntSim {
    world: World,
    schedule: Schedule,
    config: HuntConfig,
    session: SessionState,
    /// Accumulated time for fixed timestep.
    time_accumulator: f32,
}

impl HuntSim {
    /// Create a simulation with default tunables, sitting at the menu.
    pub fn new() -> Self {
        Self::with_config(HuntConfig::default())
    }

    /// Create a simulation with custom configuration.
    pub fn with_config(config: HuntConfig) -> Self {
        let (world, schedule) = Self::build(&config);
        Self {
            world,
            schedule,
            config,
            session: SessionState::Menu,
            time_accumulator: 0.0,
        }
    }

    /// Fresh world and schedule. A schedule is bound to the world it first
    /// runs on, so both are rebuilt together.
    fn build(config: &HuntConfig) -> (World, Schedule) {
        let mut world = World::new();

        // Core resources
        world.insert_resource(DeltaTime(config.fixed_timestep));
        world.insert_resource(SimClock::default());
        world.insert_resource(SimRng::seeded(config.rng_seed));
        world.insert_resource(config.clone());

        // World state
        let next_change = config.weather_cycle.then_some(config.first_weather_change_ms);
        world.insert_resource(WeatherState::new(Weather::Clear, next_change));
        world.insert_resource(PlayerState::new(config.magazine_size));
        world.insert_resource(TrailStore::from_config(config));
        world.insert_resource(ColliderRegistry::new(config.collider_cell_size));
        world.insert_resource(PopulationState::default());
        world.insert_resource(RespawnQueue::default());
        world.insert_resource(GroupCentroids::default());
        world.insert_resource(EventBuffer::with_capacity(config.event_capacity));

        let mut schedule = Schedule::default();

        // Group 1: world upkeep
        schedule.add_systems((
            stamina_system,
            weather_cycle_system,
            respawn_system,
            centroid_snapshot_system,
        ).chain());

        // Group 2: decisions (read the centroid snapshot)
        schedule.add_systems((
            behavior_timer_system,
            perception_system,
            shot_system,
        ).chain().after(centroid_snapshot_system));

        // Group 3: motion and marks
        schedule.add_systems((
            movement_system,
            collider_sync_system,
            trail_emission_system,
            trail_sweep_system,
            prop_system,
        ).chain().after(shot_system));

        (world, schedule)
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Reset everything and start a new hunt with a full population.
    pub fn start_session(&mut self) {
        let (world, schedule) = Self::build(&self.config);
        self.world = world;
        self.schedule = schedule;
        self.time_accumulator = 0.0;

        let config = self.config.clone();
        for (species, _) in spawn_quota(config.animal_count) {
            let bundle = self.world.resource_scope(|world, mut rng: Mut<SimRng>| {
                let mut population = world.resource_mut::<PopulationState>();
                let slot = population.allocate_slot();
                roll_animal(&mut population, &mut rng, &config, species, slot, 0)
            });
            self.insert_animal(bundle);
        }

        for _ in 0..self.config.prop_count {
            let prop = roll_prop(&mut self.world.resource_mut::<SimRng>(), self.config.prop_half_extent);
            self.world.spawn(prop);
        }

        self.session = SessionState::Playing;
        log::info!(
            "Hunt started: {} animals, {} props, seed {}",
            self.live_count(),
            self.config.prop_count,
            self.config.rng_seed
        );
    }

    pub fn pause(&mut self) {
        if self.session == SessionState::Playing {
            self.session = SessionState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.session == SessionState::Paused {
            self.session = SessionState::Playing;
        }
    }

    /// End the hunt. State stays readable until the next session starts.
    pub fn end_session(&mut self) {
        if matches!(self.session, SessionState::Playing | SessionState::Paused) {
            self.session = SessionState::Over;
            log::info!("Hunt over: {} kills, score {}", self.kill_count(), self.score());
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    // ------------------------------------------------------------------
    // Stepping
    // ------------------------------------------------------------------

    /// Step the simulation forward by `dt` seconds.
    ///
    /// Uses fixed timestep internally - accumulates time and runs fixed updates
    /// as needed. Does nothing unless a session is playing.
    pub fn step(&mut self, dt: f32) {
        if self.session != SessionState::Playing {
            return;
        }

        let fixed_dt = self.config.fixed_timestep;
        self.time_accumulator += dt;

        while self.time_accumulator >= fixed_dt {
            self.fixed_update(fixed_dt);
            self.time_accumulator -= fixed_dt;
        }
    }

    /// Run a single fixed timestep update.
    fn fixed_update(&mut self, dt: f32) {
        self.world.resource_mut::<DeltaTime>().0 = dt;
        self.world.resource_mut::<SimClock>().advance(dt);
        self.schedule.run(&mut self.world);
    }

    // ------------------------------------------------------------------
    // Hunter input
    // ------------------------------------------------------------------

    /// Camera position and view direction for this frame.
    pub fn set_player_view(&mut self, camera: Vec3, forward: Vec3) {
        self.world.resource_mut::<PlayerState>().set_view(camera, forward);
    }

    pub fn set_posture(&mut self, posture: Posture) {
        self.world.resource_mut::<PlayerState>().posture = posture;
    }

    pub fn set_aiming(&mut self, aiming: bool) {
        self.world.resource_mut::<PlayerState>().aiming = aiming;
    }

    pub fn set_motion(&mut self, motion: Motion) {
        self.world.resource_mut::<PlayerState>().motion = motion;
    }

    pub fn set_tracker_vision(&mut self, enabled: bool) {
        self.world.resource_mut::<PlayerState>().tracker_vision = enabled;
    }

    /// Pull the trigger. Resolved during the next fixed update.
    pub fn trigger_shoot(&mut self) {
        self.world.resource_mut::<PlayerState>().request_fire();
    }

    pub fn reload(&mut self) {
        let magazine = self.config.magazine_size;
        self.world.resource_mut::<PlayerState>().reload(magazine);
        self.world
            .resource_mut::<EventBuffer>()
            .push(SimEvent::Reloaded { ammo: magazine });
    }

    /// Force the weather. The automatic cycle keeps its schedule.
    pub fn set_weather(&mut self, weather: Weather) {
        if self.weather() == weather {
            return;
        }
        self.world.resource_mut::<WeatherState>().current = weather;
        self.world
            .resource_mut::<EventBuffer>()
            .push(SimEvent::WeatherChanged { weather });
    }

    // ------------------------------------------------------------------
    // Readouts
    // ------------------------------------------------------------------

    pub fn live_count(&self) -> usize {
        self.world.resource::<PopulationState>().live_count()
    }

    pub fn kill_count(&self) -> u32 {
        self.world.resource::<PopulationState>().kills
    }

    pub fn score(&self) -> u32 {
        self.world.resource::<PopulationState>().score
    }

    pub fn hunt_log(&self) -> &[HuntRecord] {
        self.world.resource::<PopulationState>().hunt_log()
    }

    pub fn ammo(&self) -> u32 {
        self.world.resource::<PlayerState>().ammo
    }

    pub fn stamina(&self) -> f32 {
        self.world.resource::<PlayerState>().stamina
    }

    pub fn weather(&self) -> Weather {
        self.world.resource::<WeatherState>().current
    }

    pub fn trails(&self) -> &TrailStore {
        self.world.resource::<TrailStore>()
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.world.resource::<SimClock>().tick
    }

    /// Get the elapsed simulation time in seconds.
    pub fn current_time(&self) -> f32 {
        self.world.resource::<SimClock>().seconds()
    }

    pub fn now_ms(&self) -> u64 {
        self.world.resource::<SimClock>().now_ms()
    }

    /// Events raised since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.world.resource_mut::<EventBuffer>().drain()
    }

    /// Get a snapshot of the current simulation state.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world, self.session)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Animal, scent and blood instance buffers for an instanced renderer.
    pub fn instance_buffers(&mut self) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
        let snapshot = self.snapshot();
        (
            instance_buffer::animals_to_buffer(&snapshot),
            instance_buffer::scent_to_buffer(&snapshot),
            instance_buffer::blood_to_buffer(&snapshot),
        )
    }

    /// Look up an animal by id, including carcasses awaiting respawn.
    pub fn animal(&mut self, id: AnimalId) -> Option<AnimalView> {
        let mut query = self.world.query::<(
            &AnimalId,
            &Species,
            &Position,
            &MoveTarget,
            &Health,
            &BehaviorState,
        )>();
        query
            .iter(&self.world)
            .find(|(animal_id, ..)| **animal_id == id)
            .map(|(animal_id, species, pos, target, health, state)| AnimalView {
                id: *animal_id,
                species: *species,
                position: *pos,
                target: *target,
                health: health.current,
                health_max: health.max,
                state: *state,
                alive: health.is_alive(),
            })
    }

    /// Ids of every animal in the live set.
    pub fn live_ids(&self) -> Vec<AnimalId> {
        self.world.resource::<PopulationState>().live_ids().collect()
    }

    /// Spawn an animal at a fixed point in a new slot. Used for scripted
    /// scenes and tests.
    pub fn spawn_animal_at(&mut self, species: Species, x: f32, z: f32) -> AnimalId {
        let now = self.now_ms();
        let config = &self.config;
        let bundle = self.world.resource_scope(|world, mut rng: Mut<SimRng>| {
            let mut population = world.resource_mut::<PopulationState>();
            let slot = population.allocate_slot();
            place_animal(&mut population, &mut rng, config, species, slot, x, z, now)
        });
        self.insert_animal(bundle)
    }

    /// Spawn a prepared animal, add it to the live set and register its collider.
    fn insert_animal(&mut self, bundle: AnimalBundle) -> AnimalId {
        let id = bundle.id;
        let center = collider_center(&bundle.position, &self.config);
        let entity = self.world.spawn(bundle).id();
        self.world.resource_mut::<PopulationState>().register(id, entity);
        self.world
            .resource_mut::<ColliderRegistry>()
            .insert(entity, center, self.config.collider_radius);
        id
    }

    pub fn config(&self) -> &HuntConfig {
        &self.config
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for HuntSim {
    fn default() -> Self {
        Self::new()
    }
}
