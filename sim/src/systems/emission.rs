//! Trail emission and decay.

use crate::components::*;
use crate::config::HuntConfig;
use crate::species::Species;
use crate::systems::clock::SimClock;
use crate::trails::TrailStore;
use bevy_ecs::prelude::*;

/// System that drops scent behind moving animals and blood behind wounded ones.
///
/// Idle and dead animals leave nothing. Each mark type is rate limited per
/// animal.
pub fn trail_emission_system(
    clock: Res<SimClock>,
    config: Res<HuntConfig>,
    mut trails: ResMut<TrailStore>,
    mut query: Query<(&Species, &Position, &Health, &BehaviorState, &mut BehaviorClock)>,
) {
    let now = clock.now_ms();

    for (species, pos, health, state, mut timers) in query.iter_mut() {
        if !health.is_alive() || *state == BehaviorState::Idle {
            continue;
        }

        if timers.scent_due(now, config.scent_interval_ms) {
            trails.add_scent(pos.x, pos.z, *species, now);
            timers.last_scent_ms = Some(now);
        }

        if health.is_wounded() && timers.blood_due(now, config.blood_interval_ms) {
            trails.add_blood(pos.x, pos.z, now);
            timers.last_blood_ms = Some(now);
        }
    }
}

/// System that runs the age sweep every `trail_sweep_interval_ms`.
pub fn trail_sweep_system(
    clock: Res<SimClock>,
    config: Res<HuntConfig>,
    mut trails: ResMut<TrailStore>,
) {
    let now = clock.now_ms();
    if now.saturating_sub(trails.last_sweep_ms) < config.trail_sweep_interval_ms {
        return;
    }
    let removed = trails.sweep(now);
    if removed > 0 {
        log::trace!("Trail sweep removed {} points", removed);
    }
}
