//! Hunter stamina.

use crate::config::HuntConfig;
use crate::player::{Motion, PlayerState};
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;

/// System that drains stamina while running and regenerates it otherwise.
pub fn stamina_system(dt: Res<DeltaTime>, config: Res<HuntConfig>, mut player: ResMut<PlayerState>) {
    let rate = match player.motion {
        Motion::Running => -config.stamina_drain,
        Motion::Still | Motion::Walking => config.stamina_regen,
    };
    let stamina = player.stamina + rate * dt.0;
    player.set_stamina(stamina);
}
