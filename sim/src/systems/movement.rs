//! Movement system - steers animals toward their move target.

use crate::components::*;
use crate::config::HuntConfig;
use crate::systems::clock::SimClock;
use bevy_ecs::prelude::*;
use std::f32::consts::{PI, TAU};

/// Resource containing the delta time for the current tick.
#[derive(Resource, Default)]
pub struct DeltaTime(pub f32);

/// Peak walk-bob height.
const BOB_HEIGHT: f32 = 0.15;

/// Wrap an angle difference into `[-PI, PI]`.
#[inline]
fn wrap_angle(a: f32) -> f32 {
    (a + PI).rem_euclid(TAU) - PI
}

/// Yaw that faces from `(x, z)` toward `(tx, tz)`.
#[inline]
pub fn yaw_toward(x: f32, z: f32, tx: f32, tz: f32) -> f32 {
    (tx - x).atan2(tz - z)
}

/// System that moves living animals toward their targets.
///
/// Movement is an exponential approach: each tick closes a fraction
/// `speed * dt * gain` of the remaining gap, so fleeing animals cover ground
/// fast at first and slow near the target. Wounded animals move at a
/// fraction of their normal speed. Heading eases toward the target yaw and
/// the body bobs while moving.
pub fn movement_system(
    dt: Res<DeltaTime>,
    clock: Res<SimClock>,
    config: Res<HuntConfig>,
    mut query: Query<(&mut Position, &mut Heading, &MoveTarget, &BehaviorState, &Health)>,
) {
    let delta = dt.0;
    let t = clock.seconds();

    for (mut pos, mut heading, target, state, health) in query.iter_mut() {
        if !health.is_alive() || *state == BehaviorState::Idle {
            continue;
        }

        if pos.ground_distance_to(target.x, target.z) <= config.arrive_radius {
            continue;
        }

        let mut speed = state.move_speed();
        if health.is_wounded() {
            speed *= config.wounded_speed_factor;
        }
        if speed <= 0.0 {
            continue;
        }

        let factor = (speed * delta * config.movement_gain).min(1.0);
        pos.x += (target.x - pos.x) * factor;
        pos.z += (target.z - pos.z) * factor;

        let desired = yaw_toward(pos.x, pos.z, target.x, target.z);
        heading.0 = wrap_angle(heading.0 + wrap_angle(desired - heading.0) * config.heading_smoothing);

        let bob_rate = if *state == BehaviorState::Flee { 10.0 } else { 4.0 };
        pos.y = (t * bob_rate).sin().abs() * BOB_HEIGHT;
    }
}
