//! Flat instance buffers for renderers.
//!
//! Converts a [`Snapshot`] into contiguous `f32` arrays that an instanced
//! renderer can upload without per-entity allocation.
//!
//! # Stable Layout (Version 1.0)
//!
//! Every buffer starts with a one-element header holding the record count,
//! followed by fixed-stride records.
//!
//! ```text
//! ANIMALS  offset = 1 + i * ANIMAL_STRIDE
//!   [+0]  id           animal id (u64 as f32)
//!   [+1]  x
//!   [+2]  y            walk-bob height
//!   [+3]  z
//!   [+4]  heading      yaw in radians
//!   [+5]  species_id   see SPECIES_* constants
//!   [+6]  health
//!   [+7]  health_max
//!   [+8]  is_dead      1.0 = carcass, 0.0 = alive
//!   [+9]  behavior_id  see BEHAVIOR_* constants
//!   [+10] scale        wound pulse (1.0 when unhurt)
//!
//! SCENT    offset = 1 + i * SCENT_STRIDE
//!   [+0] x  [+1] y  [+2] z  [+3] size  [+4] species_id
//!
//! BLOOD    offset = 1 + i * BLOOD_STRIDE
//!   [+0] x  [+1] y  [+2] z  [+3] size
//! ```
//!
//! Trail `size` shrinks with remaining life: `life * 0.4` for scent and
//! `life * 0.2` for blood.
//!
//! # Determinism
//!
//! The same `Snapshot` always produces the same buffers. Animals appear in
//! snapshot order (ascending id); trail points oldest first.

use crate::world::Snapshot;

/// Number of f32 values per animal.
pub const ANIMAL_STRIDE: usize = 11;
/// Number of f32 values per scent point.
pub const SCENT_STRIDE: usize = 5;
/// Number of f32 values per blood point.
pub const BLOOD_STRIDE: usize = 4;
/// Number of f32 values in every buffer header.
pub const HEADER_SIZE: usize = 1;

pub const SPECIES_DEER: f32 = 0.0;
pub const SPECIES_WOLF: f32 = 1.0;
pub const SPECIES_BEAR: f32 = 2.0;
pub const SPECIES_RABBIT: f32 = 3.0;

pub const BEHAVIOR_IDLE: f32 = 0.0;
pub const BEHAVIOR_WANDER: f32 = 1.0;
pub const BEHAVIOR_ALERT: f32 = 2.0;
pub const BEHAVIOR_FLEE: f32 = 3.0;

const SCENT_SIZE: f32 = 0.4;
const BLOOD_SIZE: f32 = 0.2;

// Field offsets within an animal record.
pub const FIELD_ID: usize = 0;
pub const FIELD_X: usize = 1;
pub const FIELD_Y: usize = 2;
pub const FIELD_Z: usize = 3;
pub const FIELD_HEADING: usize = 4;
pub const FIELD_SPECIES: usize = 5;
pub const FIELD_HEALTH: usize = 6;
pub const FIELD_HEALTH_MAX: usize = 7;
pub const FIELD_IS_DEAD: usize = 8;
pub const FIELD_BEHAVIOR: usize = 9;
pub const FIELD_SCALE: usize = 10;

#[inline]
fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Pack every animal, carcasses included.
pub fn animals_to_buffer(snapshot: &Snapshot) -> Vec<f32> {
    let count = snapshot.animals.len();
    let size = buffer_size(count, ANIMAL_STRIDE);
    let mut buffer = Vec::with_capacity(size);

    buffer.push(count as f32);
    for animal in &snapshot.animals {
        buffer.push(animal.id as f32);
        buffer.push(animal.x);
        buffer.push(animal.y);
        buffer.push(animal.z);
        buffer.push(animal.heading);
        buffer.push(animal.species.index() as f32);
        buffer.push(animal.health);
        buffer.push(animal.health_max);
        buffer.push(flag(animal.is_dead));
        buffer.push(animal.behavior.index() as f32);
        buffer.push(animal.scale);
    }

    debug_assert_eq!(buffer.len(), size, "Buffer size mismatch");
    buffer
}

/// Pack scent points for tracker vision.
pub fn scent_to_buffer(snapshot: &Snapshot) -> Vec<f32> {
    let count = snapshot.scent.len();
    let mut buffer = Vec::with_capacity(buffer_size(count, SCENT_STRIDE));

    buffer.push(count as f32);
    for point in &snapshot.scent {
        buffer.extend_from_slice(&[
            point.x,
            point.y,
            point.z,
            point.life * SCENT_SIZE,
            point.species.index() as f32,
        ]);
    }
    buffer
}

/// Pack blood points.
pub fn blood_to_buffer(snapshot: &Snapshot) -> Vec<f32> {
    let count = snapshot.blood.len();
    let mut buffer = Vec::with_capacity(buffer_size(count, BLOOD_STRIDE));

    buffer.push(count as f32);
    for point in &snapshot.blood {
        buffer.extend_from_slice(&[point.x, point.y, point.z, point.life * BLOOD_SIZE]);
    }
    buffer
}

#[inline]
pub fn buffer_size(count: usize, stride: usize) -> usize {
    HEADER_SIZE + count * stride
}

/// Record count from a buffer header, `None` if the buffer is empty.
#[inline]
pub fn parse_count(buffer: &[f32]) -> Option<usize> {
    buffer.first().map(|&c| c as usize)
}

#[inline]
pub const fn record_offset(index: usize, stride: usize) -> usize {
    HEADER_SIZE + index * stride
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::BehaviorState;
    use crate::species::Species;
    use crate::world::{AnimalSnapshot, BloodSnapshot, ScentSnapshot};

    fn animal(id: u64, species: Species, behavior: BehaviorState, is_dead: bool) -> AnimalSnapshot {
        AnimalSnapshot {
            id,
            species,
            x: id as f32,
            y: 0.1,
            z: -(id as f32),
            heading: 0.5,
            health: if is_dead { 0.0 } else { 80.0 },
            health_max: 80.0,
            behavior,
            is_dead,
            is_wounded: false,
            scale: 1.0,
        }
    }

    #[test]
    fn test_empty_buffers() {
        let snapshot = Snapshot::default();
        assert_eq!(animals_to_buffer(&snapshot), vec![0.0]);
        assert_eq!(scent_to_buffer(&snapshot), vec![0.0]);
        assert_eq!(blood_to_buffer(&snapshot), vec![0.0]);
    }

    #[test]
    fn test_animal_fields() {
        let snapshot = Snapshot {
            animals: vec![
                animal(1, Species::Wolf, BehaviorState::Alert, false),
                animal(2, Species::Rabbit, BehaviorState::Flee, true),
            ],
            ..Default::default()
        };
        let buffer = animals_to_buffer(&snapshot);
        assert_eq!(buffer.len(), buffer_size(2, ANIMAL_STRIDE));
        assert_eq!(parse_count(&buffer), Some(2));

        let first = record_offset(0, ANIMAL_STRIDE);
        assert_eq!(buffer[first + FIELD_SPECIES], SPECIES_WOLF);
        assert_eq!(buffer[first + FIELD_BEHAVIOR], BEHAVIOR_ALERT);
        assert_eq!(buffer[first + FIELD_IS_DEAD], 0.0);

        let second = record_offset(1, ANIMAL_STRIDE);
        assert_eq!(buffer[second + FIELD_ID], 2.0);
        assert_eq!(buffer[second + FIELD_Z], -2.0);
        assert_eq!(buffer[second + FIELD_SPECIES], SPECIES_RABBIT);
        assert_eq!(buffer[second + FIELD_BEHAVIOR], BEHAVIOR_FLEE);
        assert_eq!(buffer[second + FIELD_IS_DEAD], 1.0);
        assert_eq!(buffer[second + FIELD_HEALTH], 0.0);
        assert_eq!(buffer[second + FIELD_SCALE], 1.0);
    }

    #[test]
    fn test_trail_sizes_follow_life() {
        let snapshot = Snapshot {
            scent: vec![ScentSnapshot { x: 1.0, y: 0.0, z: 2.0, species: Species::Bear, life: 0.5 }],
            blood: vec![BloodSnapshot { x: 3.0, y: 0.02, z: 4.0, life: 0.5 }],
            ..Default::default()
        };
        assert_eq!(scent_to_buffer(&snapshot), vec![1.0, 1.0, 0.0, 2.0, 0.2, SPECIES_BEAR]);
        assert_eq!(blood_to_buffer(&snapshot), vec![1.0, 3.0, 0.02, 4.0, 0.1]);
    }

    #[test]
    fn test_species_and_behavior_ids_match_constants() {
        assert_eq!(Species::Deer.index() as f32, SPECIES_DEER);
        assert_eq!(Species::Bear.index() as f32, SPECIES_BEAR);
        assert_eq!(BehaviorState::Idle.index() as f32, BEHAVIOR_IDLE);
        assert_eq!(BehaviorState::Wander.index() as f32, BEHAVIOR_WANDER);
    }

    #[test]
    fn test_field_offsets_fit_stride() {
        for field in [FIELD_ID, FIELD_X, FIELD_Y, FIELD_HEADING, FIELD_HEALTH_MAX, FIELD_SCALE] {
            assert!(field < ANIMAL_STRIDE);
        }
    }
}
