//! Behavior controller - the idle/wander re-roll timer.
//!
//! Every animal carries its own re-roll timer (5-8 s, re-randomized each
//! time it fires). When it fires for an animal that is not fleeing:
//!
//! 1. An animal past the world boundary is sent back toward the center and
//!    nothing else happens this roll.
//! 2. The animal may call out.
//! 3. It either stops (idle) or picks a new wander target, usually pulled
//!    toward the centroid of its own species.
//!
//! Alert and flee escalation live in the perception system.

use crate::components::*;
use crate::config::HuntConfig;
use crate::events::{animal_call, EventBuffer};
use crate::player::PlayerState;
use crate::rng::SimRng;
use crate::species::Species;
use crate::systems::clock::SimClock;
use crate::systems::population::GroupCentroids;
use bevy_ecs::prelude::*;

/// What a fired re-roll timer decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reroll {
    /// Fleeing animals ignore the timer.
    Skip,
    /// Past the boundary: wander back toward the center.
    ReturnToCenter(MoveTarget),
    Idle { call: bool },
    Wander { target: MoveTarget, call: bool },
}

impl Reroll {
    pub fn calls(&self) -> bool {
        matches!(self, Reroll::Idle { call: true } | Reroll::Wander { call: true, .. })
    }
}

/// Decide what an animal does when its re-roll timer fires.
pub fn plan_reroll(
    pos: &Position,
    state: BehaviorState,
    centroid: Option<(f32, f32)>,
    config: &HuntConfig,
    rng: &mut SimRng,
) -> Reroll {
    if state == BehaviorState::Flee {
        return Reroll::Skip;
    }

    if pos.distance_from_center() > config.boundary_radius() {
        let spread = config.boundary_return_spread;
        return Reroll::ReturnToCenter(MoveTarget::new(rng.offset(spread), rng.offset(spread)));
    }

    let call = rng.chance(config.ambient_call_chance);

    if rng.chance(config.idle_chance) {
        return Reroll::Idle { call };
    }

    let spread = config.wander_spread;
    let biased = rng.chance(config.centroid_bias_chance);
    let pull = match centroid {
        Some((cx, cz)) if biased => {
            let dx = cx - pos.x;
            let dz = cz - pos.z;
            let len = (dx * dx + dz * dz).sqrt();
            if len > f32::EPSILON {
                (dx / len * config.centroid_pull, dz / len * config.centroid_pull)
            } else {
                (0.0, 0.0)
            }
        }
        _ => (0.0, 0.0),
    };

    Reroll::Wander {
        target: MoveTarget::new(
            pos.x + pull.0 + rng.offset(spread),
            pos.z + pull.1 + rng.offset(spread),
        ),
        call,
    }
}

/// System that fires due re-roll timers.
///
/// ## Data Access
/// - Reads: SimClock, HuntConfig, GroupCentroids, PlayerState
/// - Writes: SimRng, EventBuffer, BehaviorState, MoveTarget, BehaviorClock
pub fn behavior_timer_system(
    clock: Res<SimClock>,
    config: Res<HuntConfig>,
    centroids: Res<GroupCentroids>,
    player: Res<PlayerState>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<EventBuffer>,
    mut query: Query<(
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
    let (px, pz) = player.ground();

    for (id, species, pos, health, mut state, mut target, mut timers) in query.iter_mut() {
        if !health.is_alive() || !timers.reroll_due(now) {
            continue;
        }
        timers.next_reroll_ms = now + rng.delay_ms(config.reroll_min_ms, config.reroll_max_ms);

        let plan = plan_reroll(pos, *state, centroids.get(*species), &config, &mut rng);

        if plan.calls() {
            if let Some(call) = animal_call(
                id.0,
                *species,
                pos.ground_distance_to(px, pz),
                false,
                config.call_audible_range,
            ) {
                events.push(call);
            }
        }

        match plan {
            Reroll::Skip => {}
            Reroll::ReturnToCenter(home) => {
                log::trace!("{} {} turned back at the boundary", species.as_str(), id.0);
                *state = BehaviorState::Wander;
                *target = home;
            }
            Reroll::Idle { .. } => {
                *state = BehaviorState::Idle;
            }
            Reroll::Wander { target: next, .. } => {
                *state = BehaviorState::Wander;
                *target = next;
            }
        }
    }
}
