//! Destructible props - rocks and branches that snap underfoot.

use crate::components::*;
use crate::config::HuntConfig;
use crate::events::{EventBuffer, SimEvent};
use crate::player::PlayerState;
use crate::rng::SimRng;
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;
use glam::Vec3;
use std::f32::consts::PI;

const GRAVITY: f32 = -25.0;
/// Life lost per second while shattering.
const FADE_RATE: f32 = 0.8;
/// Physics step cap so a long frame cannot fling pieces.
const MAX_STEP: f32 = 0.05;

/// Build a prop with random kind, size and rotation.
pub fn roll_prop(rng: &mut SimRng, half_extent: f32) -> PropBundle {
    let (x, z) = rng.ground_point(half_extent);
    let kind = if rng.chance(0.5) { PropKind::Rock } else { PropKind::Branch };
    let scale = 0.5 + rng.unit() * 0.8;
    let yaw = rng.unit() * PI;
    PropBundle::new(kind, x, z, scale, yaw)
}

/// System that breaks props the hunter steps on and animates the pieces.
pub fn prop_system(
    dt: Res<DeltaTime>,
    config: Res<HuntConfig>,
    player: Res<PlayerState>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<EventBuffer>,
    mut query: Query<(&PropKind, &mut Position, &mut PropState, &mut PropMotion)>,
) {
    let step = dt.0.min(MAX_STEP);
    let (px, pz) = player.ground();

    for (kind, mut pos, mut state, mut motion) in query.iter_mut() {
        match *state {
            PropState::Intact => {
                if pos.ground_distance_to(px, pz) < config.prop_break_radius {
                    *state = PropState::Shattering;
                    motion.velocity = Vec3::new(
                        rng.offset(1.0),
                        2.0 + rng.unit() * 2.0,
                        rng.offset(1.0),
                    );
                    events.push(SimEvent::PropSnapped { kind: *kind, x: pos.x, z: pos.z });
                }
            }
            PropState::Shattering => {
                motion.velocity.y += GRAVITY * step;
                pos.x += motion.velocity.x * step;
                pos.y += motion.velocity.y * step;
                pos.z += motion.velocity.z * step;
                motion.life -= step * FADE_RATE;

                if pos.y < 0.0 {
                    pos.y = 0.0;
                    motion.velocity = Vec3::ZERO;
                }
                if motion.life <= 0.0 {
                    motion.life = 0.0;
                    *state = PropState::Gone;
                }
            }
            PropState::Gone => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop_world() -> World {
        let mut world = World::new();
        world.insert_resource(DeltaTime(1.0 / 60.0));
        world.insert_resource(HuntConfig::default());
        world.insert_resource(PlayerState::default());
        world.insert_resource(SimRng::seeded(6));
        world.insert_resource(EventBuffer::default());
        world
    }

    #[test]
    fn test_stepping_on_prop_breaks_it() {
        let mut world = prop_world();
        let near = world.spawn(PropBundle::new(PropKind::Branch, 1.0, 0.0, 1.0, 0.0)).id();
        let far = world.spawn(PropBundle::new(PropKind::Rock, 5.0, 0.0, 1.0, 0.0)).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(prop_system);
        schedule.run(&mut world);

        assert_eq!(*world.get::<PropState>(near).unwrap(), PropState::Shattering);
        assert_eq!(*world.get::<PropState>(far).unwrap(), PropState::Intact);
        let events = world.resource_mut::<EventBuffer>().drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], SimEvent::PropSnapped { kind: PropKind::Branch, .. }));
    }

    #[test]
    fn test_shattered_prop_fades_out() {
        let mut world = prop_world();
        let prop = world.spawn(PropBundle::new(PropKind::Rock, 0.5, 0.5, 1.0, 0.0)).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(prop_system);
        // 1 / 0.8 s of fade at 60 Hz, plus margin.
        for _ in 0..80 {
            schedule.run(&mut world);
        }

        assert_eq!(*world.get::<PropState>(prop).unwrap(), PropState::Gone);
        assert_eq!(world.get::<PropMotion>(prop).unwrap().current_scale(), 0.0);
        assert!(world.get::<Position>(prop).unwrap().y >= 0.0);
        // Only snaps once.
        assert_eq!(world.resource::<EventBuffer>().len(), 1);
    }

    #[test]
    fn test_rolled_props_in_bounds() {
        let mut rng = SimRng::seeded(10);
        for _ in 0..100 {
            let prop = roll_prop(&mut rng, 225.0);
            assert!(prop.position.x.abs() <= 225.0 && prop.position.z.abs() <= 225.0);
            assert!((0.5..=1.3).contains(&prop.motion.scale));
        }
    }
}
