//! Spatial partitioning for proximity queries between cats.
//!
//! Provides O(1) cell lookup and O(k) neighbor queries where k is the
//! number of cats in nearby cells. The pairing scan is quadratic in the
//! worst case either way at this population size; the grid keeps each
//! candidate's neighborhood small.

use crate::components::{MinglingCat, Position, Single};
use bevy_ecs::prelude::*;
use std::collections::HashMap;

/// Grid-based spatial partitioning structure.
///
/// Divides the arena into cells and tracks which cats are in each cell,
/// rebuilt once per tick after the transform sync.
#[derive(Resource, Debug)]
pub struct SpatialGrid {
    /// Cell size in world units.
    pub cell_size: f32,
    /// Map from cell coordinates to cats in that cell.
    cells: HashMap<(i32, i32), Vec<SpatialEntry>>,
    /// Total number of tracked cats.
    count: usize,
}

/// Entry in a spatial cell.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub entity: Entity,
    pub x: f32,
    pub y: f32,
    /// Whether this cat is a single mingling cat (pairing-eligible).
    pub eligible: bool,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(4.0)
    }
}

impl SpatialGrid {
    /// Create a new spatial grid with the given cell size.
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            count: 0,
        }
    }

    /// Convert world coordinates to cell coordinates.
    #[inline]
    pub fn world_to_cell(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Clear all entries (call before rebuilding each tick).
    pub fn clear(&mut self) {
        self.cells.clear();
        self.count = 0;
    }

    /// Insert a cat at a position.
    pub fn insert(&mut self, entity: Entity, x: f32, y: f32, eligible: bool) {
        let cell = self.world_to_cell(x, y);
        self.cells.entry(cell).or_default().push(SpatialEntry {
            entity,
            x,
            y,
            eligible,
        });
        self.count += 1;
    }

    /// Query all cats within a radius of a point, closest first.
    pub fn query_radius(&self, x: f32, y: f32, radius: f32) -> Vec<SpatialEntry> {
        let radius_sq = radius * radius;
        let cells_to_check = (radius / self.cell_size).ceil() as i32 + 1;
        let center_cell = self.world_to_cell(x, y);

        let mut results = Vec::new();

        for dx in -cells_to_check..=cells_to_check {
            for dy in -cells_to_check..=cells_to_check {
                let cell = (center_cell.0 + dx, center_cell.1 + dy);
                if let Some(entries) = self.cells.get(&cell) {
                    for entry in entries {
                        let dist_sq = (entry.x - x).powi(2) + (entry.y - y).powi(2);
                        if dist_sq <= radius_sq {
                            results.push(*entry);
                        }
                    }
                }
            }
        }

        results.sort_by(|a, b| {
            let dist_a = (a.x - x).powi(2) + (a.y - y).powi(2);
            let dist_b = (b.x - x).powi(2) + (b.y - y).powi(2);
            dist_a.partial_cmp(&dist_b).unwrap_or(std::cmp::Ordering::Equal)
        });

        results
    }

    /// Query pairing-eligible cats within a radius, excluding the querying
    /// cat itself.
    pub fn query_eligible(&self, entity: Entity, x: f32, y: f32, radius: f32) -> Vec<SpatialEntry> {
        let mut results = self.query_radius(x, y, radius);
        results.retain(|e| e.eligible && e.entity != entity);
        results
    }

    /// Total tracked cat count.
    pub fn total_count(&self) -> usize {
        self.count
    }
}

/// System that rebuilds the spatial grid each tick from synced positions.
pub fn spatial_grid_update_system(
    mut grid: ResMut<SpatialGrid>,
    query: Query<(Entity, &Position, Option<&MinglingCat>, Option<&Single>)>,
) {
    grid.clear();

    for (entity, pos, mingling, single) in query.iter() {
        let eligible = mingling.is_some() && single.is_some();
        grid.insert(entity, pos.x, pos.y, eligible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spatial_grid_insert_query() {
        let mut grid = SpatialGrid::new(4.0);

        let e1 = Entity::from_raw(1);
        let e2 = Entity::from_raw(2);
        let e3 = Entity::from_raw(3);

        grid.insert(e1, 1.0, 1.0, true);
        grid.insert(e2, 3.0, 1.0, true);
        grid.insert(e3, 20.0, 20.0, true);

        let nearby = grid.query_radius(1.0, 1.0, 5.0);
        assert_eq!(nearby.len(), 2);

        let nearby = grid.query_radius(1.0, 1.0, 1.0);
        assert_eq!(nearby.len(), 1);

        let nearby = grid.query_radius(20.0, 20.0, 2.0);
        assert_eq!(nearby.len(), 1);
    }

    #[test]
    fn test_query_eligible_filters_self_and_taken() {
        let mut grid = SpatialGrid::new(4.0);

        let me = Entity::from_raw(1);
        let single = Entity::from_raw(2);
        let taken = Entity::from_raw(3);

        grid.insert(me, 0.0, 0.0, true);
        grid.insert(single, 1.0, 0.0, true);
        grid.insert(taken, 0.5, 0.0, false);

        let candidates = grid.query_eligible(me, 0.0, 0.0, 3.0);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].entity, single);
    }

    #[test]
    fn test_results_sorted_by_distance() {
        let mut grid = SpatialGrid::new(4.0);

        let far = Entity::from_raw(1);
        let near = Entity::from_raw(2);

        grid.insert(far, 3.0, 0.0, true);
        grid.insert(near, 1.0, 0.0, true);

        let results = grid.query_radius(0.0, 0.0, 5.0);
        assert_eq!(results[0].entity, near);
        assert_eq!(results[1].entity, far);
    }

    #[test]
    fn test_update_system_tracks_eligibility() {
        use crate::components::{MinglingCat, Single};

        let mut world = World::new();
        world.insert_resource(SpatialGrid::new(4.0));

        world.spawn((Position::new(0.0, 0.0), MinglingCat, Single));
        world.spawn((Position::new(1.0, 0.0), MinglingCat)); // matched
        world.spawn(Position::new(2.0, 0.0)); // player-ish, no mingling

        let mut schedule = Schedule::default();
        schedule.add_systems(spatial_grid_update_system);
        schedule.run(&mut world);

        let grid = world.resource::<SpatialGrid>();
        assert_eq!(grid.total_count(), 3);
        let eligible: Vec<_> = grid
            .query_radius(0.0, 0.0, 10.0)
            .into_iter()
            .filter(|e| e.eligible)
            .collect();
        assert_eq!(eligible.len(), 1);
    }
}
