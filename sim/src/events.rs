//! Per-tick gameplay events for the host (audio cues, HUD messages).
//!
//! Systems push into [`EventBuffer`]; the host drains it after stepping.
//! The buffer holds a bounded window of the most recent events, so a host
//! that never drains only loses the oldest ones.

use crate::components::PropKind;
use crate::environment::Weather;
use crate::species::Species;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Events kept when the host does not drain.
pub const DEFAULT_EVENT_CAPACITY: usize = 512;

/// Why a fire attempt did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotBlocked {
    NoAmmo,
    Cooldown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    ShotFired {
        /// Id of the animal struck, if any.
        hit: Option<u64>,
        ammo_left: u32,
    },
    ShotIgnored {
        reason: ShotBlocked,
    },
    AnimalWounded {
        id: u64,
        species: Species,
        health: f32,
    },
    AnimalKilled {
        id: u64,
        species: Species,
        score: u32,
        distance: f32,
    },
    AnimalRespawned {
        id: u64,
        species: Species,
        x: f32,
        z: f32,
    },
    AnimalCall {
        id: u64,
        species: Species,
        frequency: f32,
        volume: f32,
        alert: bool,
    },
    PropSnapped {
        kind: PropKind,
        x: f32,
        z: f32,
    },
    WeatherChanged {
        weather: Weather,
    },
    Reloaded {
        ammo: u32,
    },
}

/// Bounded buffer of events raised since the last drain.
#[derive(Resource, Debug)]
pub struct EventBuffer {
    events: VecDeque<SimEvent>,
    capacity: usize,
    /// Events evicted unread since the buffer was created.
    dropped: u64,
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Append an event, evicting the oldest when full.
    pub fn push(&mut self, event: SimEvent) {
        if self.events.len() >= self.capacity {
            self.events.pop_front();
            if self.dropped == 0 {
                log::debug!("Event buffer full ({}), dropping oldest events", self.capacity);
            }
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    /// Take every buffered event, oldest first.
    pub fn drain(&mut self) -> Vec<SimEvent> {
        self.events.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Build a call event if the caller is within earshot of the hunter.
///
/// Volume falls off linearly to zero at `audible_range`; alert calls are
/// louder than ambient ones.
pub fn animal_call(
    id: u64,
    species: Species,
    distance: f32,
    alert: bool,
    audible_range: f32,
) -> Option<SimEvent> {
    if distance >= audible_range {
        return None;
    }
    let peak = if alert { 0.25 } else { 0.1 };
    Some(SimEvent::AnimalCall {
        id,
        species,
        frequency: species.call_frequency(),
        volume: (1.0 - distance / audible_range) * peak,
        alert,
    })
}
