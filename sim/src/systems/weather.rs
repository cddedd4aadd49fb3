//! Automatic weather cycle.

use crate::config::HuntConfig;
use crate::environment::{Weather, WeatherState};
use crate::events::{EventBuffer, SimEvent};
use crate::rng::SimRng;
use crate::systems::clock::SimClock;
use bevy_ecs::prelude::*;

/// System that rolls new weather when the cycle timer comes due.
///
/// The new weather is drawn uniformly from all four kinds, so it may repeat.
pub fn weather_cycle_system(
    clock: Res<SimClock>,
    config: Res<HuntConfig>,
    mut weather: ResMut<WeatherState>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<EventBuffer>,
) {
    let Some(due) = weather.next_change_ms else {
        return;
    };
    let now = clock.now_ms();
    if now < due {
        return;
    }

    let next = rng.pick(&Weather::ALL).unwrap_or_default();
    weather.next_change_ms =
        Some(now + rng.delay_ms(config.weather_min_interval_ms, config.weather_max_interval_ms));

    if next != weather.current {
        log::info!("Weather {} -> {}", weather.current.as_str(), next.as_str());
        weather.current = next;
        events.push(SimEvent::WeatherChanged { weather: next });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_world(now_ms: u64, next_change: Option<u64>) -> World {
        let mut world = World::new();
        world.insert_resource(SimClock::at_ms(now_ms));
        world.insert_resource(HuntConfig::default());
        world.insert_resource(WeatherState::new(Weather::Clear, next_change));
        world.insert_resource(SimRng::seeded(8));
        world.insert_resource(EventBuffer::default());
        world
    }

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(weather_cycle_system);
        schedule.run(world);
    }

    #[test]
    fn test_change_waits_for_timer() {
        let mut world = weather_world(29_999, Some(30_000));
        run(&mut world);
        assert_eq!(world.resource::<WeatherState>().next_change_ms, Some(30_000));
    }

    #[test]
    fn test_change_reschedules() {
        let mut world = weather_world(30_000, Some(30_000));
        run(&mut world);
        let next = world.resource::<WeatherState>().next_change_ms.unwrap();
        assert!((75_000..=135_000).contains(&next), "next change at {}", next);
    }

    #[test]
    fn test_disabled_cycle_never_changes() {
        let mut world = weather_world(1_000_000, None);
        run(&mut world);
        assert_eq!(world.resource::<WeatherState>().current, Weather::Clear);
        assert!(world.resource::<EventBuffer>().is_empty());
    }
}
