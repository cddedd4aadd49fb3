//! Perception - animals noticing the hunter.
//!
//! Each living animal checks for the hunter at most once per perception
//! interval. Detection is the union of three senses:
//!
//! - **Sight**: long range, cut by fog and storms
//! - **Scent**: short fixed range, unaffected by weather
//! - **Hearing**: longer while the hunter is winded from running, cut by storms
//!
//! ## Phases
//!
//! 1. **Gather** - read-only: collect due animals and compute a verdict for each
//!    with the pure [`evaluate`] function
//! 2. **Apply** - sequential: write state transitions, targets and call events
//!
//! With `--features parallel` the verdicts are computed with rayon.

use crate::components::*;
use crate::config::HuntConfig;
use crate::environment::{Weather, WeatherState};
use crate::events::{animal_call, EventBuffer};
use crate::player::PlayerState;
use crate::species::Species;
use crate::systems::clock::SimClock;
use bevy_ecs::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Outcome of one perception check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// The hunter went unnoticed.
    Unaware,
    /// Noticed but not close enough to bolt.
    Alert,
    /// Noticed and inside the flee trigger distance.
    Flee,
}

/// Everything the perception model looks at.
#[derive(Debug, Clone, Copy)]
pub struct PerceptionInput {
    pub animal: (f32, f32),
    pub player: (f32, f32),
    pub player_stamina: f32,
    pub weather: Weather,
}

/// Verdict plus the ground distance it was based on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    pub detection: Detection,
    pub distance: f32,
}

/// Pure perception model.
pub fn evaluate(input: &PerceptionInput, config: &HuntConfig) -> Perception {
    let dx = input.animal.0 - input.player.0;
    let dz = input.animal.1 - input.player.1;
    let distance = (dx * dx + dz * dz).sqrt();

    let sight = config.sight_range * input.weather.sight_modifier();
    let hearing_base = if input.player_stamina < config.running_stamina_threshold {
        config.hearing_range_running
    } else {
        config.hearing_range_quiet
    };
    let hearing = hearing_base * input.weather.hearing_modifier();

    let detected = distance < sight || distance < config.scent_range || distance < hearing;

    let detection = if !detected {
        Detection::Unaware
    } else if distance < config.flee_trigger_distance {
        Detection::Flee
    } else {
        Detection::Alert
    };

    Perception { detection, distance }
}

/// Point `run_distance` away from the hunter, straight out from `animal`.
/// When the two overlap the animal has no escape direction and stays put.
pub fn flee_target(animal: (f32, f32), player: (f32, f32), run_distance: f32) -> MoveTarget {
    let dx = animal.0 - player.0;
    let dz = animal.1 - player.1;
    let len = (dx * dx + dz * dz).sqrt();
    if len <= f32::EPSILON {
        return MoveTarget::new(animal.0, animal.1);
    }
    MoveTarget::new(
        animal.0 + dx / len * run_distance,
        animal.1 + dz / len * run_distance,
    )
}

/// Read-only snapshot of one animal due for a check.
#[derive(Debug, Clone, Copy)]
struct PerceptionCandidate {
    entity: Entity,
    input: PerceptionInput,
}

/// System that escalates animals to alert or flee when they detect the hunter.
///
/// ## Data Access
/// - Reads: SimClock, HuntConfig, WeatherState, PlayerState
/// - Writes: BehaviorState, MoveTarget, BehaviorClock, EventBuffer
pub fn perception_system(
    clock: Res<SimClock>,
    config: Res<HuntConfig>,
    weather: Res<WeatherState>,
    player: Res<PlayerState>,
    mut events: ResMut<EventBuffer>,
    mut query: Query<(
        Entity,
        &AnimalId,
        &Species,
        &Position,
        &Health,
        &mut BehaviorState,
        &mut MoveTarget,
        &mut BehaviorClock,
    )>,
) {
    let now = clock.now_ms();
    let config: &HuntConfig = &config;
    let player_ground = player.ground();

    // GATHER: animals due for a check
    let candidates: Vec<PerceptionCandidate> = query
        .iter()
        .filter(|(_, _, _, _, health, _, _, timers)| {
            health.is_alive() && timers.perception_due(now, config.perception_interval_ms)
        })
        .map(|(entity, _, _, pos, _, _, _, _)| PerceptionCandidate {
            entity,
            input: PerceptionInput {
                animal: (pos.x, pos.z),
                player: player_ground,
                player_stamina: player.stamina,
                weather: weather.current,
            },
        })
        .collect();

    // COMPUTE
    #[cfg(feature = "parallel")]
    let verdicts: Vec<(Entity, Perception)> = candidates
        .par_iter()
        .map(|c| (c.entity, evaluate(&c.input, config)))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let verdicts: Vec<(Entity, Perception)> = candidates
        .iter()
        .map(|c| (c.entity, evaluate(&c.input, config)))
        .collect();

    // APPLY
    for (entity, perception) in verdicts {
        let Ok((_, id, species, pos, _, mut state, mut target, mut timers)) = query.get_mut(entity)
        else {
            continue;
        };
        timers.last_perception_ms = Some(now);

        if perception.detection == Detection::Unaware || *state == BehaviorState::Flee {
            continue;
        }

        let previous = *state;
        *state = BehaviorState::Alert;
        if perception.detection == Detection::Flee {
            *state = BehaviorState::Flee;
            *target = flee_target((pos.x, pos.z), player_ground, config.flee_run_distance);
        }

        if *state != previous {
            log::debug!(
                "{} {} {} -> {} at {:.1}",
                species.as_str(),
                id.0,
                previous.as_str(),
                state.as_str(),
                perception.distance
            );
            if let Some(call) =
                animal_call(id.0, *species, perception.distance, true, config.call_audible_range)
            {
                events.push(call);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(distance: f32, stamina: f32, weather: Weather) -> PerceptionInput {
        PerceptionInput {
            animal: (distance, 0.0),
            player: (0.0, 0.0),
            player_stamina: stamina,
            weather,
        }
    }

    #[test]
    fn test_sight_range_by_weather() {
        let config = HuntConfig::default();
        // 40 is inside clear sight (45) but outside fog sight (18) and quiet hearing.
        assert_eq!(evaluate(&input(40.0, 100.0, Weather::Clear), &config).detection, Detection::Alert);
        assert_eq!(evaluate(&input(40.0, 100.0, Weather::Rainy), &config).detection, Detection::Alert);
        assert_eq!(evaluate(&input(40.0, 100.0, Weather::Foggy), &config).detection, Detection::Unaware);
        assert_eq!(evaluate(&input(40.0, 100.0, Weather::Stormy), &config).detection, Detection::Unaware);
    }

    #[test]
    fn test_hearing_depends_on_stamina() {
        let config = HuntConfig::default();
        // 30 in fog: sight 18, scent 18, hearing 38 while winded, 15 when rested.
        assert_eq!(evaluate(&input(30.0, 50.0, Weather::Foggy), &config).detection, Detection::Alert);
        assert_eq!(evaluate(&input(30.0, 95.0, Weather::Foggy), &config).detection, Detection::Unaware);
        // Storm shrinks winded hearing to 15.2.
        assert_eq!(evaluate(&input(30.0, 50.0, Weather::Stormy), &config).detection, Detection::Unaware);
    }

    #[test]
    fn test_scent_ignores_weather() {
        let config = HuntConfig::default();
        let p = evaluate(&input(17.0, 100.0, Weather::Stormy), &config);
        assert_eq!(p.detection, Detection::Flee);
        assert!((p.distance - 17.0).abs() < 1e-6);
    }

    #[test]
    fn test_flee_target_points_away() {
        let target = flee_target((10.0, 0.0), (0.0, 0.0), 50.0);
        assert_eq!(target, MoveTarget::new(60.0, 0.0));
        let target = flee_target((3.0, 3.0), (3.0, 3.0), 50.0);
        assert_eq!(target, MoveTarget::new(3.0, 3.0));
    }

    fn perception_world(weather: Weather) -> World {
        let mut world = World::new();
        world.insert_resource(SimClock::at_ms(1_000));
        world.insert_resource(HuntConfig::default());
        world.insert_resource(WeatherState::new(weather, None));
        let mut player = PlayerState::default();
        player.camera = glam::Vec3::new(0.0, 1.7, 0.0);
        world.insert_resource(player);
        world.insert_resource(EventBuffer::default());
        world
    }

    #[test]
    fn test_close_animal_flees_away_from_hunter() {
        let mut world = perception_world(Weather::Clear);
        let deer = world
            .spawn(AnimalBundle::new(AnimalId(1), Species::Deer, SpawnSlot(0), 10.0, 0.0, 0.0, 99_999))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(perception_system);
        schedule.run(&mut world);

        assert_eq!(*world.get::<BehaviorState>(deer).unwrap(), BehaviorState::Flee);
        assert_eq!(*world.get::<MoveTarget>(deer).unwrap(), MoveTarget::new(60.0, 0.0));

        let events = world.resource_mut::<EventBuffer>().drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], crate::events::SimEvent::AnimalCall { alert: true, .. }));
    }

    #[test]
    fn test_cadence_limits_checks() {
        let mut world = perception_world(Weather::Clear);
        let wolf = world
            .spawn(AnimalBundle::new(AnimalId(2), Species::Wolf, SpawnSlot(0), 100.0, 0.0, 0.0, 99_999))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(perception_system);
        schedule.run(&mut world);
        assert_eq!(world.get::<BehaviorClock>(wolf).unwrap().last_perception_ms, Some(1_000));

        // Hunter walks up, but the next check is not due yet.
        world.resource_mut::<PlayerState>().camera = glam::Vec3::new(95.0, 1.7, 0.0);
        *world.resource_mut::<SimClock>() = SimClock::at_ms(1_300);
        schedule.run(&mut world);
        assert_eq!(*world.get::<BehaviorState>(wolf).unwrap(), BehaviorState::Wander);

        *world.resource_mut::<SimClock>() = SimClock::at_ms(1_400);
        schedule.run(&mut world);
        assert_eq!(*world.get::<BehaviorState>(wolf).unwrap(), BehaviorState::Flee);
    }

    #[test]
    fn test_dead_animals_are_not_perceiving() {
        let mut world = perception_world(Weather::Clear);
        let mut bundle = AnimalBundle::new(AnimalId(3), Species::Rabbit, SpawnSlot(0), 5.0, 0.0, 0.0, 0);
        bundle.health.current = 0.0;
        let rabbit = world.spawn(bundle).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(perception_system);
        schedule.run(&mut world);

        assert_eq!(*world.get::<BehaviorState>(rabbit).unwrap(), BehaviorState::Wander);
        assert_eq!(world.get::<BehaviorClock>(rabbit).unwrap().last_perception_ms, None);
        assert!(world.resource::<EventBuffer>().is_empty());
    }

    #[test]
    fn test_fleeing_animal_keeps_its_target() {
        let mut world = perception_world(Weather::Clear);
        let mut bundle = AnimalBundle::new(AnimalId(5), Species::Deer, SpawnSlot(0), 8.0, 0.0, 0.0, 99_999);
        bundle.state = BehaviorState::Flee;
        bundle.target = MoveTarget::new(-40.0, 120.0);
        let deer = world.spawn(bundle).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(perception_system);
        for ms in [1_000, 1_400, 1_800, 2_200] {
            *world.resource_mut::<SimClock>() = SimClock::at_ms(ms);
            schedule.run(&mut world);
            assert_eq!(world.get::<BehaviorClock>(deer).unwrap().last_perception_ms, Some(ms));
        }

        assert_eq!(*world.get::<BehaviorState>(deer).unwrap(), BehaviorState::Flee);
        assert_eq!(*world.get::<MoveTarget>(deer).unwrap(), MoveTarget::new(-40.0, 120.0));
        assert!(world.resource::<EventBuffer>().is_empty());
    }

    #[test]
    fn test_alert_animal_holds_until_close() {
        let mut world = perception_world(Weather::Clear);
        let bear = world
            .spawn(AnimalBundle::new(AnimalId(4), Species::Bear, SpawnSlot(0), 0.0, 30.0, 0.0, 99_999))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(perception_system);
        schedule.run(&mut world);
        assert_eq!(*world.get::<BehaviorState>(bear).unwrap(), BehaviorState::Alert);
        // Target untouched on a plain alert.
        assert_eq!(*world.get::<MoveTarget>(bear).unwrap(), MoveTarget::new(0.0, 30.0));
    }
}
