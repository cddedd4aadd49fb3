//! Collider registry for shot ray queries.
//!
//! Living animals register a sphere collider on spawn and leave the registry
//! on death. Colliders are bucketed into a ground-plane grid so a ray only
//! tests the cells it passes through rather than every animal.

use crate::components::{Health, Position};
use crate::config::HuntConfig;
use bevy_ecs::prelude::*;
use glam::Vec3;
use std::collections::{HashMap, HashSet};

/// Sphere collider registered for one animal.
#[derive(Debug, Clone, Copy)]
pub struct ColliderEntry {
    pub entity: Entity,
    pub center: Vec3,
    pub radius: f32,
}

/// Nearest ray intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    /// Distance along the ray from its origin.
    pub distance: f32,
    pub point: Vec3,
}

/// Grid-bucketed sphere colliders.
#[derive(Resource, Debug)]
pub struct ColliderRegistry {
    /// Cell size in world units. Must exceed every collider radius.
    pub cell_size: f32,
    cells: HashMap<(i32, i32), Vec<ColliderEntry>>,
    /// Reverse lookup: entity to cell.
    entity_cells: HashMap<Entity, (i32, i32)>,
}

impl Default for ColliderRegistry {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl ColliderRegistry {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            entity_cells: HashMap::new(),
        }
    }

    /// Convert ground coordinates to cell coordinates.
    #[inline]
    pub fn world_to_cell(&self, x: f32, z: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (z / self.cell_size).floor() as i32,
        )
    }

    /// Register an entity, or move it if already registered.
    pub fn insert(&mut self, entity: Entity, center: Vec3, radius: f32) {
        let cell = self.world_to_cell(center.x, center.z);

        if let Some(old_cell) = self.entity_cells.insert(entity, cell) {
            if let Some(entries) = self.cells.get_mut(&old_cell) {
                entries.retain(|e| e.entity != entity);
            }
        }

        self.cells
            .entry(cell)
            .or_default()
            .push(ColliderEntry { entity, center, radius });
    }

    /// Unregister an entity. Returns whether it was registered.
    pub fn remove(&mut self, entity: Entity) -> bool {
        match self.entity_cells.remove(&entity) {
            Some(cell) => {
                if let Some(entries) = self.cells.get_mut(&cell) {
                    entries.retain(|e| e.entity != entity);
                }
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entity_cells.contains_key(&entity)
    }

    pub fn get(&self, entity: Entity) -> Option<ColliderEntry> {
        let cell = self.entity_cells.get(&entity)?;
        self.cells
            .get(cell)?
            .iter()
            .find(|e| e.entity == entity)
            .copied()
    }

    pub fn total_count(&self) -> usize {
        self.entity_cells.len()
    }

    pub fn cell_count(&self, cell: (i32, i32)) -> usize {
        self.cells.get(&cell).map(|v| v.len()).unwrap_or(0)
    }

    /// Cast a ray and return the nearest collider hit within `max_distance`.
    ///
    /// Walks the ray's ground projection in half-cell steps and tests the
    /// 3x3 block of cells around each step, visiting every cell once.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let step = self.cell_size * 0.5;
        let steps = (max_distance / step).ceil() as i32;
        let mut visited: HashSet<(i32, i32)> = HashSet::new();
        let mut best: Option<RayHit> = None;

        for i in 0..=steps {
            let along = (i as f32 * step).min(max_distance);
            let sample = origin + dir * along;
            let (cx, cz) = self.world_to_cell(sample.x, sample.z);

            for dx in -1..=1 {
                for dz in -1..=1 {
                    let cell = (cx + dx, cz + dz);
                    if !visited.insert(cell) {
                        continue;
                    }
                    let Some(entries) = self.cells.get(&cell) else {
                        continue;
                    };
                    for entry in entries {
                        let Some(t) = ray_sphere(origin, dir, entry.center, entry.radius) else {
                            continue;
                        };
                        if t > max_distance {
                            continue;
                        }
                        if best.map_or(true, |b| t < b.distance) {
                            best = Some(RayHit {
                                entity: entry.entity,
                                distance: t,
                                point: origin + dir * t,
                            });
                        }
                    }
                }
            }
        }

        best
    }
}

/// Distance along a normalized ray to the first intersection with a sphere,
/// or `None` on a miss or when the sphere is entirely behind the origin.
pub fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let near = -b - sqrt_disc;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + sqrt_disc;
    // Origin inside the sphere.
    if far >= 0.0 {
        Some(0.0)
    } else {
        None
    }
}

/// Collider center for an animal standing at `pos`.
#[inline]
pub fn collider_center(pos: &Position, config: &HuntConfig) -> Vec3 {
    Vec3::new(pos.x, pos.y + config.collider_height, pos.z)
}

/// System that moves registered colliders to their animals' new positions.
/// Unregistered (dead) animals are never re-added.
pub fn collider_sync_system(
    config: Res<HuntConfig>,
    mut registry: ResMut<ColliderRegistry>,
    query: Query<(Entity, &Position, &Health)>,
) {
    for (entity, pos, health) in query.iter() {
        if !health.is_alive() || !registry.contains(entity) {
            continue;
        }
        registry.insert(entity, collider_center(pos, &config), config.collider_radius);
    }
}
