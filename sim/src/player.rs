//! Hunter state pushed in by the input collaborator.

use bevy_ecs::prelude::*;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Body posture. Lower postures steady the rifle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Posture {
    #[default]
    Standing,
    Crouching,
    Prone,
}

impl Posture {
    /// Multiplier on shot spread.
    pub fn stability(self) -> f32 {
        match self {
            Posture::Standing => 1.0,
            Posture::Crouching => 0.4,
            Posture::Prone => 0.2,
        }
    }
}

/// What the hunter's legs are doing this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Motion {
    #[default]
    Still,
    Walking,
    Running,
}

#[derive(Resource, Debug, Clone)]
pub struct PlayerState {
    /// Camera (eye) position. Its ground projection is the hunter's position.
    pub camera: Vec3,
    /// Normalized view direction.
    pub forward: Vec3,
    pub posture: Posture,
    pub aiming: bool,
    pub motion: Motion,
    /// In `[0, 100]`.
    pub stamina: f32,
    pub ammo: u32,
    /// Time of the last accepted shot.
    pub last_shot_ms: Option<u64>,
    pub tracker_vision: bool,
    fire_requests: u64,
    fire_consumed: u64,
}

impl PlayerState {
    pub const MAX_STAMINA: f32 = 100.0;

    pub fn new(ammo: u32) -> Self {
        Self {
            camera: Vec3::new(0.0, 1.7, 0.0),
            forward: Vec3::NEG_Z,
            posture: Posture::Standing,
            aiming: false,
            motion: Motion::Still,
            stamina: Self::MAX_STAMINA,
            ammo,
            last_shot_ms: None,
            tracker_vision: false,
            fire_requests: 0,
            fire_consumed: 0,
        }
    }

    /// Hunter's ground position.
    pub fn ground(&self) -> (f32, f32) {
        (self.camera.x, self.camera.z)
    }

    pub fn set_view(&mut self, camera: Vec3, forward: Vec3) {
        self.camera = camera;
        let forward = forward.normalize_or_zero();
        if forward != Vec3::ZERO {
            self.forward = forward;
        }
    }

    pub fn set_stamina(&mut self, stamina: f32) {
        self.stamina = stamina.clamp(0.0, Self::MAX_STAMINA);
    }

    /// Register one pull of the trigger.
    pub fn request_fire(&mut self) {
        self.fire_requests = self.fire_requests.wrapping_add(1);
    }

    /// Number of trigger pulls not yet processed. Each is returned once.
    pub fn take_fire_requests(&mut self) -> u64 {
        let pending = self.fire_requests.wrapping_sub(self.fire_consumed);
        self.fire_consumed = self.fire_requests;
        pending
    }

    pub fn reload(&mut self, magazine_size: u32) {
        self.ammo = magazine_size;
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(10)
    }
}
