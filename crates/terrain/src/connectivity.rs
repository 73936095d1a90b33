//! Walkable-region analysis over the grid, run on request only.
//!
//! Two cells are connected when they are 4-neighbors, both walkable, and the
//! edge between them is not a cliff from either side. Ramps and natural edges
//! are always passable.

use bevy::prelude::*;
use pathfinding::prelude::{astar, bfs_reach};

use crate::edges::classify_edge;
use crate::grid::{Direction, TerrainGrid};

/// Result of one validation pass.
#[derive(Event, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectivityReport {
    pub walkable_cells: usize,
    /// Number of disjoint walkable regions.
    pub regions: usize,
    /// Cell count of the largest region.
    pub largest_region: usize,
    /// One cell of every region smaller than the validator's minimum size.
    pub small_regions: Vec<(usize, usize)>,
}

impl ConnectivityReport {
    pub fn is_connected(&self) -> bool {
        self.regions <= 1
    }
}

/// Read-only check over a grid, invoked by the editor on demand.
pub trait GridValidator: Send + Sync {
    fn validate(&self, grid: &TerrainGrid) -> ConnectivityReport;
}

/// Flood-fills walkable regions and flags the small ones.
#[derive(Debug, Clone, Copy)]
pub struct WalkableRegions {
    /// Regions with fewer cells than this are listed in `small_regions`.
    pub min_region_size: usize,
}

impl Default for WalkableRegions {
    fn default() -> Self {
        Self { min_region_size: 4 }
    }
}

/// Whether a unit can step from (x, y) to its neighbor in `dir`.
pub fn passable(grid: &TerrainGrid, x: usize, y: usize, dir: Direction) -> bool {
    let Some(next) = grid.neighbor(x, y, dir) else {
        return false;
    };
    if !grid.get(x, y).walkable || !next.walkable {
        return false;
    }
    let (dx, dy) = dir.offset();
    let (nx, ny) = ((x as i32 + dx) as usize, (y as i32 + dy) as usize);
    !classify_edge(grid, x, y, dir).is_cliff() && !classify_edge(grid, nx, ny, dir.opposite()).is_cliff()
}

fn walkable_neighbors(grid: &TerrainGrid, (x, y): (usize, usize)) -> Vec<(usize, usize)> {
    Direction::ALL
        .iter()
        .filter(|&&dir| passable(grid, x, y, dir))
        .map(|&dir| {
            let (dx, dy) = dir.offset();
            ((x as i32 + dx) as usize, (y as i32 + dy) as usize)
        })
        .collect()
}

/// Shortest walkable path between two cells, inclusive of both ends.
pub fn find_walk_path(
    grid: &TerrainGrid,
    start: (usize, usize),
    goal: (usize, usize),
) -> Option<Vec<(usize, usize)>> {
    if !grid.in_bounds(start.0 as i32, start.1 as i32) || !grid.get(start.0, start.1).walkable {
        return None;
    }
    let result = astar(
        &start,
        |&cell| walkable_neighbors(grid, cell).into_iter().map(|n| (n, 1u32)),
        |&(x, y)| (x.abs_diff(goal.0) + y.abs_diff(goal.1)) as u32,
        |&cell| cell == goal,
    );
    result.map(|(path, _cost)| path)
}

impl GridValidator for WalkableRegions {
    fn validate(&self, grid: &TerrainGrid) -> ConnectivityReport {
        let mut visited = vec![false; grid.width() * grid.height()];
        let mut report = ConnectivityReport::default();

        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let idx = grid.index(x, y);
                if visited[idx] || !grid.get(x, y).walkable {
                    continue;
                }
                let mut size = 0;
                for (rx, ry) in bfs_reach((x, y), |&cell| walkable_neighbors(grid, cell)) {
                    visited[grid.index(rx, ry)] = true;
                    size += 1;
                }
                report.walkable_cells += size;
                report.regions += 1;
                report.largest_region = report.largest_region.max(size);
                if size < self.min_region_size {
                    report.small_regions.push((x, y));
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Cell, EdgeStyle};

    #[test]
    fn test_open_ground_is_one_region() {
        let grid = TerrainGrid::new(6, 4);
        let report = WalkableRegions::default().validate(&grid);
        assert_eq!(report.regions, 1);
        assert_eq!(report.walkable_cells, 24);
        assert_eq!(report.largest_region, 24);
        assert!(report.is_connected());
        assert!(report.small_regions.is_empty());
    }

    #[test]
    fn test_unwalkable_wall_splits_map() {
        let mut grid = TerrainGrid::new(5, 3);
        for y in 0..3 {
            grid.get_mut(2, y).walkable = false;
        }
        let report = WalkableRegions::default().validate(&grid);
        assert_eq!(report.regions, 2);
        assert_eq!(report.walkable_cells, 12);
        assert_eq!(report.largest_region, 6);
    }

    #[test]
    fn test_cliff_isolates_raised_platform() {
        let mut grid = TerrainGrid::new(5, 5);
        *grid.get_mut(2, 2) = Cell::platform(120);
        let report = WalkableRegions::default().validate(&grid);
        assert_eq!(report.regions, 2);
        assert_eq!(report.small_regions, vec![(2, 2)]);
        assert!(find_walk_path(&grid, (0, 0), (2, 2)).is_none());
    }

    #[test]
    fn test_ramp_edge_reconnects_platform() {
        let mut grid = TerrainGrid::new(5, 5);
        let mut top = Cell::platform(120);
        top.edge_overrides[Direction::West.index()] = Some(EdgeStyle::Ramp);
        *grid.get_mut(2, 2) = top;
        let report = WalkableRegions::default().validate(&grid);
        assert_eq!(report.regions, 1);

        let path = find_walk_path(&grid, (0, 2), (2, 2)).unwrap();
        assert_eq!(path, vec![(0, 2), (1, 2), (2, 2)]);
    }

    #[test]
    fn test_path_to_unwalkable_start_is_none() {
        let mut grid = TerrainGrid::new(3, 3);
        grid.get_mut(0, 0).walkable = false;
        assert!(find_walk_path(&grid, (0, 0), (2, 2)).is_none());
        assert_eq!(find_walk_path(&grid, (1, 1), (1, 1)), Some(vec![(1, 1)]));
    }

    #[test]
    fn test_empty_grid_has_no_regions() {
        let report = WalkableRegions::default().validate(&TerrainGrid::new(0, 0));
        assert_eq!(report, ConnectivityReport::default());
        assert!(report.is_connected());
    }
}
