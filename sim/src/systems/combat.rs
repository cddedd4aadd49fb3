//! Hit resolution - rifle shots against the collider registry.
//!
//! ## Pipeline
//!
//! 1. Each pending trigger pull becomes one fire attempt. An attempt with an
//!    empty magazine or inside the cooldown is a no-op.
//! 2. An accepted shot spends a round and perturbs the view direction by a
//!    spread built from stamina, aim, weather and posture.
//! 3. The ray is cast against the collider registry; the nearest sphere
//!    within range is struck.
//! 4. The struck animal takes species damage, is forced to flee away from
//!    the impact, and on reaching zero health leaves the live set, is tallied
//!    once and gets a respawn queued.

use crate::components::*;
use crate::config::HuntConfig;
use crate::environment::{Weather, WeatherState};
use crate::events::{EventBuffer, ShotBlocked, SimEvent};
use crate::player::PlayerState;
use crate::rng::SimRng;
use crate::spatial::ColliderRegistry;
use crate::species::Species;
use crate::systems::clock::SimClock;
use crate::systems::population::{PopulationState, RespawnEntry, RespawnQueue};
use bevy_ecs::prelude::*;
use glam::Vec3;

/// Spread added per point of missing stamina.
const STAMINA_SPREAD: f32 = 0.0005;
const HIP_SPREAD: f32 = 0.02;
const AIMED_SPREAD: f32 = 0.002;
/// Aiming down the sights tightens the whole cone.
const AIMED_MULTIPLIER: f32 = 0.35;

/// Whether a fire attempt goes off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireCheck {
    Ready,
    Blocked(ShotBlocked),
}

pub fn check_fire(player: &PlayerState, now_ms: u64, cooldown_ms: u64) -> FireCheck {
    if player.ammo == 0 {
        return FireCheck::Blocked(ShotBlocked::NoAmmo);
    }
    match player.last_shot_ms {
        Some(last) if now_ms.saturating_sub(last) < cooldown_ms => {
            FireCheck::Blocked(ShotBlocked::Cooldown)
        }
        _ => FireCheck::Ready,
    }
}

/// Width of the shot cone in view-space units.
pub fn shot_spread(player: &PlayerState, weather: Weather) -> f32 {
    let stamina_deficit = PlayerState::MAX_STAMINA - player.stamina;
    let base = if player.aiming { AIMED_SPREAD } else { HIP_SPREAD };
    let aim = if player.aiming { AIMED_MULTIPLIER } else { 1.0 };
    (stamina_deficit * STAMINA_SPREAD + base + weather.shot_inaccuracy())
        * player.posture.stability()
        * aim
}

/// Perturb `forward` by uniform offsets in `[-spread/2, spread/2]` along the
/// camera's right and up axes.
pub fn perturb_direction(forward: Vec3, spread: f32, rng: &mut SimRng) -> Vec3 {
    let forward = forward.normalize_or_zero();
    if forward == Vec3::ZERO {
        return forward;
    }
    let right = forward.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
    let up = right.cross(forward);
    let half = spread * 0.5;
    (forward + right * rng.offset(half) + up * rng.offset(half)).normalize_or_zero()
}

/// What a hit did to an animal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    /// Target was already dead.
    Ignored,
    Wounded { health: f32 },
    Killed,
}

/// Apply one rifle hit. Health drops by the species damage, clamped at zero;
/// the animal bolts with its target pushed `push` units away from the impact.
pub fn apply_hit(
    species: Species,
    position: &Position,
    health: &mut Health,
    state: &mut BehaviorState,
    target: &mut MoveTarget,
    impact: Vec3,
    push: f32,
) -> HitOutcome {
    if !health.is_alive() {
        return HitOutcome::Ignored;
    }

    health.damage(species.hit_damage());
    *state = BehaviorState::Flee;

    let away = Vec3::new(position.x - impact.x, 0.0, position.z - impact.z).normalize_or_zero();
    target.x += away.x * push;
    target.z += away.z * push;

    if health.is_alive() {
        HitOutcome::Wounded { health: health.current }
    } else {
        HitOutcome::Killed
    }
}

/// System that turns trigger pulls into shots.
///
/// ## Data Access
/// - Reads: SimClock, HuntConfig, WeatherState
/// - Writes: PlayerState, SimRng, ColliderRegistry, PopulationState,
///   RespawnQueue, EventBuffer, Health, BehaviorState, MoveTarget
#[allow(clippy::too_many_arguments)]
pub fn shot_system(
    clock: Res<SimClock>,
    config: Res<HuntConfig>,
    weather: Res<WeatherState>,
    mut player: ResMut<PlayerState>,
    mut rng: ResMut<SimRng>,
    mut registry: ResMut<ColliderRegistry>,
    mut population: ResMut<PopulationState>,
    mut queue: ResMut<RespawnQueue>,
    mut events: ResMut<EventBuffer>,
    mut animals: Query<(
        &AnimalId,
        &Species,
        &SpawnSlot,
        &Position,
        &mut Health,
        &mut BehaviorState,
        &mut MoveTarget,
    )>,
) {
    let now = clock.now_ms();
    let pulls = player.take_fire_requests();

    for _ in 0..pulls {
        if let FireCheck::Blocked(reason) = check_fire(&player, now, config.shot_cooldown_ms) {
            log::debug!("Shot ignored: {:?}", reason);
            events.push(SimEvent::ShotIgnored { reason });
            continue;
        }

        player.ammo -= 1;
        player.last_shot_ms = Some(now);

        let spread = shot_spread(&player, weather.current);
        let direction = perturb_direction(player.forward, spread, &mut rng);
        let hit = registry.raycast(player.camera, direction, config.shot_range);

        let mut struck = None;
        if let Some(hit) = hit {
            if let Ok((id, species, slot, pos, mut health, mut state, mut target)) =
                animals.get_mut(hit.entity)
            {
                let outcome = apply_hit(
                    *species,
                    pos,
                    &mut health,
                    &mut state,
                    &mut target,
                    hit.point,
                    config.hit_flee_push,
                );

                match outcome {
                    HitOutcome::Ignored => {}
                    HitOutcome::Wounded { health } => {
                        struck = Some(id.0);
                        log::debug!("Hit {} {} ({:.0} hp left)", species.as_str(), id.0, health);
                        events.push(SimEvent::AnimalWounded { id: id.0, species: *species, health });
                    }
                    HitOutcome::Killed => {
                        struck = Some(id.0);
                        registry.remove(hit.entity);
                        let (px, pz) = player.ground();
                        let distance = pos.ground_distance_to(px, pz);
                        if let Some(record) = population.record_kill(*id, *species, now, distance) {
                            queue.schedule(RespawnEntry {
                                species: *species,
                                slot: *slot,
                                fire_at_ms: now + config.respawn_delay_ms,
                                carcass: Some(hit.entity),
                            });
                            log::info!(
                                "Killed {} {} at {:.1}m (+{})",
                                species.as_str(),
                                id.0,
                                distance,
                                record.score
                            );
                            events.push(SimEvent::AnimalKilled {
                                id: id.0,
                                species: *species,
                                score: record.score,
                                distance,
                            });
                        }
                    }
                }
            }
        }

        events.push(SimEvent::ShotFired { hit: struck, ammo_left: player.ammo });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Posture;
    use crate::spatial::collider_center;

    #[test]
    fn test_spread_formula() {
        let mut player = PlayerState::default();
        assert!((shot_spread(&player, Weather::Clear) - 0.02).abs() < 1e-6);

        player.aiming = true;
        player.posture = Posture::Prone;
        player.set_stamina(60.0);
        // (40 * 0.0005 + 0.002 + 0.012) * 0.2 * 0.35
        let expected = (0.02 + 0.002 + 0.012) * 0.2 * 0.35;
        assert!((shot_spread(&player, Weather::Stormy) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_perturbed_direction_stays_in_cone() {
        let mut rng = SimRng::seeded(2);
        let forward = Vec3::new(0.0, 0.0, 1.0);
        for _ in 0..100 {
            let dir = perturb_direction(forward, 0.02, &mut rng);
            assert!((dir.length() - 1.0).abs() < 1e-5);
            assert!(dir.x.abs() <= 0.0101 && dir.y.abs() <= 0.0101);
        }
        // Straight up still has a usable basis.
        let up = perturb_direction(Vec3::Y, 0.0, &mut rng);
        assert!((up - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_check_fire() {
        let mut player = PlayerState::new(1);
        assert_eq!(check_fire(&player, 0, 350), FireCheck::Ready);
        player.last_shot_ms = Some(1_000);
        assert_eq!(check_fire(&player, 1_349, 350), FireCheck::Blocked(ShotBlocked::Cooldown));
        assert_eq!(check_fire(&player, 1_350, 350), FireCheck::Ready);
        player.ammo = 0;
        assert_eq!(check_fire(&player, 5_000, 350), FireCheck::Blocked(ShotBlocked::NoAmmo));
    }

    #[test]
    fn test_apply_hit_pushes_target_away() {
        let pos = Position::on_ground(10.0, 0.0);
        let mut health = Health::new(300.0);
        let mut state = BehaviorState::Idle;
        let mut target = MoveTarget::new(10.0, 0.0);

        let outcome = apply_hit(
            Species::Bear,
            &pos,
            &mut health,
            &mut state,
            &mut target,
            Vec3::new(9.2, 0.4, 0.0),
            60.0,
        );
        assert_eq!(outcome, HitOutcome::Wounded { health: 260.0 });
        assert_eq!(state, BehaviorState::Flee);
        assert!((target.x - 70.0).abs() < 1e-4);
    }

    #[test]
    fn test_hit_on_dead_is_noop() {
        let pos = Position::on_ground(0.0, 0.0);
        let mut health = Health { current: 0.0, max: 100.0 };
        let mut state = BehaviorState::Wander;
        let mut target = MoveTarget::new(1.0, 1.0);
        let outcome = apply_hit(Species::Deer, &pos, &mut health, &mut state, &mut target, Vec3::X, 60.0);
        assert_eq!(outcome, HitOutcome::Ignored);
        assert_eq!(state, BehaviorState::Wander);
        assert_eq!(target, MoveTarget::new(1.0, 1.0));
    }

    fn shooting_world() -> World {
        let mut world = World::new();
        let config = HuntConfig::default();
        world.insert_resource(SimClock::at_ms(10_000));
        world.insert_resource(WeatherState::default());
        let mut player = PlayerState::new(config.magazine_size);
        player.set_view(Vec3::new(0.0, 0.4, 0.0), Vec3::Z);
        player.aiming = true;
        player.posture = Posture::Prone;
        world.insert_resource(player);
        world.insert_resource(SimRng::seeded(4));
        world.insert_resource(ColliderRegistry::new(config.collider_cell_size));
        world.insert_resource(PopulationState::default());
        world.insert_resource(RespawnQueue::default());
        world.insert_resource(EventBuffer::default());
        world.insert_resource(config);
        world
    }

    fn spawn_registered(world: &mut World, species: Species, x: f32, z: f32) -> Entity {
        let id = world.resource_mut::<PopulationState>().allocate_id();
        let bundle = AnimalBundle::new(id, species, SpawnSlot(id.0 as u32), x, z, 0.0, 99_999);
        let center = collider_center(&bundle.position, world.resource::<HuntConfig>());
        let entity = world.spawn(bundle).id();
        world.resource_mut::<PopulationState>().register(id, entity);
        world.resource_mut::<ColliderRegistry>().insert(entity, center, 0.8);
        entity
    }

    fn fire(world: &mut World) {
        world.resource_mut::<PlayerState>().request_fire();
        let mut schedule = Schedule::default();
        schedule.add_systems(shot_system);
        schedule.run(world);
    }

    #[test]
    fn test_deer_killed_in_one_shot() {
        let mut world = shooting_world();
        let deer = spawn_registered(&mut world, Species::Deer, 0.0, 20.0);

        fire(&mut world);

        assert!(world.get::<Health>(deer).unwrap().is_dead());
        let population = world.resource::<PopulationState>();
        assert_eq!(population.live_count(), 0);
        assert_eq!(population.kills, 1);
        assert_eq!(population.score, 50);
        let record = population.hunt_log()[0];
        assert!((record.distance - 20.0).abs() < 1e-4);
        assert!(!world.resource::<ColliderRegistry>().contains(deer));

        let queue = world.resource::<RespawnQueue>();
        assert_eq!(queue.next_due_ms(), Some(30_000));
        assert_eq!(world.resource::<PlayerState>().ammo, 9);
    }

    #[test]
    fn test_nearest_animal_takes_the_round() {
        let mut world = shooting_world();
        let far = spawn_registered(&mut world, Species::Deer, 0.0, 40.0);
        let near = spawn_registered(&mut world, Species::Wolf, 0.0, 20.0);

        fire(&mut world);

        assert!(world.get::<Health>(near).unwrap().is_dead());
        assert!(world.get::<Health>(far).unwrap().is_alive());
    }

    #[test]
    fn test_cooldown_consumes_nothing() {
        let mut world = shooting_world();
        let bear = spawn_registered(&mut world, Species::Bear, 0.0, 20.0);

        // Two pulls in the same tick: the second lands inside the cooldown.
        world.resource_mut::<PlayerState>().request_fire();
        fire(&mut world);

        assert_eq!(world.get::<Health>(bear).unwrap().current, 260.0);
        assert_eq!(world.resource::<PlayerState>().ammo, 9);
        let events = world.resource_mut::<EventBuffer>().drain();
        assert!(events.contains(&SimEvent::ShotIgnored { reason: ShotBlocked::Cooldown }));
    }

    #[test]
    fn test_empty_magazine_is_noop() {
        let mut world = shooting_world();
        let deer = spawn_registered(&mut world, Species::Deer, 0.0, 20.0);
        world.resource_mut::<PlayerState>().ammo = 0;

        fire(&mut world);

        assert!(world.get::<Health>(deer).unwrap().is_alive());
        assert_eq!(world.resource::<PlayerState>().last_shot_ms, None);
    }

    #[test]
    fn test_trigger_pull_processed_once() {
        let mut world = shooting_world();
        fire(&mut world);
        assert_eq!(world.resource::<PlayerState>().ammo, 9);

        *world.resource_mut::<SimClock>() = SimClock::at_ms(20_000);
        let mut schedule = Schedule::default();
        schedule.add_systems(shot_system);
        schedule.run(&mut world);
        assert_eq!(world.resource::<PlayerState>().ammo, 9);
    }
}
