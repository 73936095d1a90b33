use serde::{Deserialize, Serialize};

use crate::config::{clamp_elevation, CELL_SIZE};
use crate::error::TerrainError;
use crate::features::{FeatureId, FeatureTable, FEATURE_GROUND};

/// Cardinal direction from a cell to one of its neighbors. North is -Y (-Z in world space).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::West => 3,
        }
    }

    #[inline]
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

/// Corner of a cell, named by the two edges that meet there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::NorthWest,
        Corner::NorthEast,
        Corner::SouthWest,
        Corner::SouthEast,
    ];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Corner::NorthWest => 0,
            Corner::NorthEast => 1,
            Corner::SouthWest => 2,
            Corner::SouthEast => 3,
        }
    }

    /// The (north/south, east/west) edges adjacent to this corner.
    pub fn edges(self) -> (Direction, Direction) {
        match self {
            Corner::NorthWest => (Direction::North, Direction::West),
            Corner::NorthEast => (Direction::North, Direction::East),
            Corner::SouthWest => (Direction::South, Direction::West),
            Corner::SouthEast => (Direction::South, Direction::East),
        }
    }

    /// Offset to the diagonal neighbor.
    pub fn offset(self) -> (i32, i32) {
        let (v, h) = self.edges();
        (h.offset().0, v.offset().1)
    }
}

/// Authoring override for how one edge of a cell is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeStyle {
    Cliff,
    Natural,
    Ramp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub elevation: u8,
    pub feature: FeatureId,
    pub walkable: bool,
    pub platform: bool,
    pub ramp: bool,
    pub texture_variant: u8,
    /// Per-direction override, indexed by `Direction::index`.
    pub edge_overrides: [Option<EdgeStyle>; 4],
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            elevation: 0,
            feature: FEATURE_GROUND,
            walkable: true,
            platform: false,
            ramp: false,
            texture_variant: 0,
            edge_overrides: [None; 4],
        }
    }
}

impl Cell {
    pub fn platform(elevation: u8) -> Self {
        Self {
            elevation,
            platform: true,
            ..Default::default()
        }
    }

    #[inline]
    pub fn edge_override(&self, dir: Direction) -> Option<EdgeStyle> {
        self.edge_overrides[dir.index()]
    }
}

/// A partial cell: only the `Some` fields are written by an update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellPatch {
    pub elevation: Option<u8>,
    pub feature: Option<FeatureId>,
    pub walkable: Option<bool>,
    pub platform: Option<bool>,
    pub ramp: Option<bool>,
    pub texture_variant: Option<u8>,
    /// Set (`Some(style)`) or clear (`None`) the override for one direction.
    pub edge_override: Option<(Direction, Option<EdgeStyle>)>,
}

impl CellPatch {
    pub fn elevation(elevation: u8) -> Self {
        Self {
            elevation: Some(elevation),
            ..Default::default()
        }
    }

    /// Elevation from brush math, clamped into range.
    pub fn elevation_clamped(value: i32) -> Self {
        Self::elevation(clamp_elevation(value))
    }

    pub fn with_platform(mut self, platform: bool) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_ramp(mut self, ramp: bool) -> Self {
        self.ramp = Some(ramp);
        self
    }

    pub fn with_feature(mut self, feature: FeatureId) -> Self {
        self.feature = Some(feature);
        self
    }

    pub fn with_walkable(mut self, walkable: bool) -> Self {
        self.walkable = Some(walkable);
        self
    }

    pub fn with_texture_variant(mut self, variant: u8) -> Self {
        self.texture_variant = Some(variant);
        self
    }

    pub fn with_edge_override(mut self, dir: Direction, style: Option<EdgeStyle>) -> Self {
        self.edge_override = Some((dir, style));
        self
    }

    fn apply(&self, cell: &mut Cell, features: &FeatureTable) {
        if let Some(elevation) = self.elevation {
            cell.elevation = elevation;
        }
        if let Some(feature) = self.feature {
            cell.feature = feature;
            if self.walkable.is_none() {
                cell.walkable = features.resolve(feature).walkable;
            }
        }
        if let Some(walkable) = self.walkable {
            cell.walkable = walkable;
        }
        if let Some(platform) = self.platform {
            cell.platform = platform;
        }
        if let Some(ramp) = self.ramp {
            cell.ramp = ramp;
        }
        if let Some(variant) = self.texture_variant {
            cell.texture_variant = variant;
        }
        if let Some((dir, style)) = self.edge_override {
            cell.edge_overrides[dir.index()] = style;
        }
    }
}

/// One entry of a paint batch. Coordinates are signed because brush math
/// routinely produces candidates past the map edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellUpdate {
    pub x: i32,
    pub y: i32,
    pub patch: CellPatch,
}

impl CellUpdate {
    pub fn new(x: i32, y: i32, patch: CellPatch) -> Self {
        Self { x, y, patch }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainGrid {
    cells: Vec<Cell>,
    width: usize,
    height: usize,
}

impl TerrainGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Cell::default())
    }

    pub fn filled(width: usize, height: usize, cell: Cell) -> Self {
        Self {
            cells: vec![cell; width * height],
            width,
            height,
        }
    }

    pub fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Result<Self, TerrainError> {
        if cells.len() != width * height {
            return Err(TerrainError::InvalidGrid {
                width,
                height,
                cells: cells.len(),
            });
        }
        Ok(Self {
            cells,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &Cell {
        &self.cells[self.index(x, y)]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        let idx = self.index(x, y);
        &mut self.cells[idx]
    }

    /// Cell at signed coordinates, `None` outside the grid.
    #[inline]
    pub fn get_checked(&self, x: i32, y: i32) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(self.get(x as usize, y as usize))
        } else {
            None
        }
    }

    /// The neighbor of (x, y) in `dir`, `None` past the map boundary.
    #[inline]
    pub fn neighbor(&self, x: usize, y: usize, dir: Direction) -> Option<&Cell> {
        let (dx, dy) = dir.offset();
        self.get_checked(x as i32 + dx, y as i32 + dy)
    }

    /// Coordinates of the cell containing a world-space point; may lie outside the grid.
    pub fn world_to_grid(world_x: f32, world_z: f32) -> (i32, i32) {
        let gx = (world_x / CELL_SIZE).floor() as i32;
        let gy = (world_z / CELL_SIZE).floor() as i32;
        (gx, gy)
    }

    /// World-space center of a cell.
    pub fn grid_to_world(gx: usize, gy: usize) -> (f32, f32) {
        let wx = gx as f32 * CELL_SIZE + CELL_SIZE * 0.5;
        let wz = gy as f32 * CELL_SIZE + CELL_SIZE * 0.5;
        (wx, wz)
    }

    /// Apply a paint batch in order. Out-of-bounds entries are skipped.
    /// Returns the coordinates that were actually written, in batch order.
    pub fn apply_cell_updates(
        &mut self,
        updates: &[CellUpdate],
        features: &FeatureTable,
    ) -> Vec<(usize, usize)> {
        let mut touched = Vec::with_capacity(updates.len());
        for update in updates {
            if !self.in_bounds(update.x, update.y) {
                continue;
            }
            let (x, y) = (update.x as usize, update.y as usize);
            update.patch.apply(self.get_mut(x, y), features);
            touched.push((x, y));
        }
        touched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FEATURE_DEEP_WATER, FEATURE_FOREST};

    #[test]
    fn test_direction_offsets_are_opposite() {
        for dir in Direction::ALL {
            let (dx, dy) = dir.offset();
            let (ox, oy) = dir.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn test_corner_offsets() {
        assert_eq!(Corner::NorthWest.offset(), (-1, -1));
        assert_eq!(Corner::NorthEast.offset(), (1, -1));
        assert_eq!(Corner::SouthWest.offset(), (-1, 1));
        assert_eq!(Corner::SouthEast.offset(), (1, 1));
    }

    #[test]
    fn test_from_cells_rejects_wrong_length() {
        let err = TerrainGrid::from_cells(3, 3, vec![Cell::default(); 8]).unwrap_err();
        assert!(matches!(err, TerrainError::InvalidGrid { cells: 8, .. }));
    }

    #[test]
    fn test_out_of_bounds_updates_are_ignored() {
        let mut grid = TerrainGrid::new(4, 4);
        let features = FeatureTable::default();
        let touched = grid.apply_cell_updates(
            &[
                CellUpdate::new(-1, 0, CellPatch::elevation(9)),
                CellUpdate::new(4, 2, CellPatch::elevation(9)),
                CellUpdate::new(2, 3, CellPatch::elevation(9)),
                CellUpdate::new(0, 99, CellPatch::elevation(9)),
            ],
            &features,
        );
        assert_eq!(touched, vec![(2, 3)]);
        assert_eq!(grid.get(2, 3).elevation, 9);
        assert_eq!(
            grid.cells().iter().filter(|c| c.elevation == 9).count(),
            1
        );
    }

    #[test]
    fn test_patch_only_writes_set_fields() {
        let mut grid = TerrainGrid::filled(2, 2, Cell::platform(50));
        let features = FeatureTable::default();
        grid.apply_cell_updates(
            &[CellUpdate::new(1, 1, CellPatch::default().with_ramp(true))],
            &features,
        );
        let cell = grid.get(1, 1);
        assert!(cell.ramp);
        assert!(cell.platform);
        assert_eq!(cell.elevation, 50);
    }

    #[test]
    fn test_feature_change_derives_walkability() {
        let mut grid = TerrainGrid::new(2, 2);
        let features = FeatureTable::default();
        grid.apply_cell_updates(
            &[
                CellUpdate::new(0, 0, CellPatch::default().with_feature(FEATURE_DEEP_WATER)),
                CellUpdate::new(
                    1,
                    0,
                    CellPatch::default()
                        .with_feature(FEATURE_DEEP_WATER)
                        .with_walkable(true),
                ),
                CellUpdate::new(0, 1, CellPatch::default().with_feature(FEATURE_FOREST)),
            ],
            &features,
        );
        assert!(!grid.get(0, 0).walkable);
        assert!(grid.get(1, 0).walkable);
        assert!(grid.get(0, 1).walkable);
    }

    #[test]
    fn test_unknown_feature_defaults_to_walkable() {
        let mut grid = TerrainGrid::new(1, 1);
        grid.get_mut(0, 0).walkable = false;
        grid.apply_cell_updates(
            &[CellUpdate::new(0, 0, CellPatch::default().with_feature(4242))],
            &FeatureTable::default(),
        );
        assert_eq!(grid.get(0, 0).feature, 4242);
        assert!(grid.get(0, 0).walkable);
    }

    #[test]
    fn test_edge_override_set_and_clear() {
        let mut grid = TerrainGrid::new(1, 1);
        let features = FeatureTable::default();
        grid.apply_cell_updates(
            &[CellUpdate::new(
                0,
                0,
                CellPatch::default().with_edge_override(Direction::East, Some(EdgeStyle::Ramp)),
            )],
            &features,
        );
        assert_eq!(grid.get(0, 0).edge_override(Direction::East), Some(EdgeStyle::Ramp));
        grid.apply_cell_updates(
            &[CellUpdate::new(
                0,
                0,
                CellPatch::default().with_edge_override(Direction::East, None),
            )],
            &features,
        );
        assert_eq!(grid.get(0, 0).edge_override(Direction::East), None);
    }

    #[test]
    fn test_neighbor_at_boundary() {
        let grid = TerrainGrid::new(3, 3);
        assert!(grid.neighbor(0, 0, Direction::North).is_none());
        assert!(grid.neighbor(0, 0, Direction::West).is_none());
        assert!(grid.neighbor(0, 0, Direction::East).is_some());
        assert!(grid.neighbor(2, 2, Direction::South).is_none());
    }

    #[test]
    fn test_world_grid_roundtrip() {
        for (gx, gy) in [(0, 0), (3, 7), (12, 1)] {
            let (wx, wz) = TerrainGrid::grid_to_world(gx, gy);
            assert_eq!(TerrainGrid::world_to_grid(wx, wz), (gx as i32, gy as i32));
        }
    }
}
