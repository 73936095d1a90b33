//! Per-cell edge and corner classification with a dense lazy cache.
//!
//! Each cell gets four `EdgeInfo`s (north, south, east, west) and four corner
//! kinds (nw, ne, sw, se). Both depend only on the 3x3 neighborhood of the
//! cell, so an edit to (x, y) invalidates exactly the 3x3 block around it.
//!
//! The cache is a `Vec<Option<CellEdgeInfo>>` indexed `y * width + x`. The
//! classifier never owns the grid; every query borrows it from the session.

mod classify;


pub use classify::{classify_cell, classify_corner, classify_edge};

use bevy::prelude::*;

use crate::dirty::CellRect;
use crate::error::{try_alloc, TerrainError};
use crate::grid::{Corner, Direction, TerrainGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Cliff,
    Natural,
    Ramp,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CornerKind {
    Convex,
    Concave,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeInfo {
    pub kind: EdgeKind,
    /// Self elevation minus neighbor elevation (neighbor counts as 0 past the map edge).
    pub elevation_delta: i16,
    /// World-space height of the wall, zero unless `kind` is `Cliff`.
    pub cliff_height: f32,
}

impl EdgeInfo {
    pub const NONE: EdgeInfo = EdgeInfo {
        kind: EdgeKind::None,
        elevation_delta: 0,
        cliff_height: 0.0,
    };

    #[inline]
    pub fn is_cliff(&self) -> bool {
        self.kind == EdgeKind::Cliff
    }

    /// A cliff seen from its top: this cell is the higher side and owns the face.
    #[inline]
    pub fn is_drop(&self) -> bool {
        self.is_cliff() && self.elevation_delta > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellEdgeInfo {
    pub x: usize,
    pub y: usize,
    pub edges: [EdgeInfo; 4],
    pub corners: [CornerKind; 4],
}

impl CellEdgeInfo {
    #[inline]
    pub fn edge(&self, dir: Direction) -> &EdgeInfo {
        &self.edges[dir.index()]
    }

    #[inline]
    pub fn corner(&self, corner: Corner) -> CornerKind {
        self.corners[corner.index()]
    }

    pub fn cliff_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_cliff()).count()
    }

    pub fn has_cliff(&self) -> bool {
        self.edges.iter().any(EdgeInfo::is_cliff)
    }
}

/// Counters for observing cache behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifierStats {
    /// Cells classified from scratch.
    pub computed: u64,
    /// Queries answered from the cache.
    pub hits: u64,
    /// Cache entries dropped by invalidation.
    pub invalidated: u64,
}

#[derive(Debug, Default)]
pub struct EdgeClassifier {
    width: usize,
    height: usize,
    cache: Vec<Option<CellEdgeInfo>>,
    stats: ClassifierStats,
}

impl EdgeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to a (new) grid: resize and drop the whole cache.
    pub fn set_grid(&mut self, grid: &TerrainGrid) {
        self.width = grid.width();
        self.height = grid.height();
        self.cache.clear();
        self.cache.resize(self.width * self.height, None);
    }

    /// `set_grid` for loads: a refused cache allocation is returned and the
    /// classifier keeps its previous grid.
    pub fn try_set_grid(&mut self, grid: &TerrainGrid) -> Result<(), TerrainError> {
        let len = grid.cells().len();
        let mut cache = try_alloc("edge cache", len)?;
        cache.resize(len, None);
        self.width = grid.width();
        self.height = grid.height();
        self.cache = cache;
        Ok(())
    }

    pub fn stats(&self) -> ClassifierStats {
        self.stats
    }

    /// Number of cells with a live cache entry.
    pub fn cached_count(&self) -> usize {
        self.cache.iter().filter(|e| e.is_some()).count()
    }

    #[inline]
    pub fn is_cached(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cache[y * self.width + x].is_some()
    }

    /// Drop the 3x3 block around each coordinate.
    pub fn invalidate_cells(&mut self, coords: &[(usize, usize)]) {
        for &(x, y) in coords {
            self.invalidate_rect(CellRect::single(x, y).expand(1));
        }
    }

    /// Drop every entry inside `rect` (clipped to the grid).
    pub fn invalidate_rect(&mut self, rect: CellRect) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let Some(rect) = rect.clamp_to(self.width - 1, self.height - 1) else {
            return;
        };
        for (x, y) in rect.iter() {
            let idx = y * self.width + x;
            if self.cache[idx].take().is_some() {
                self.stats.invalidated += 1;
            }
        }
    }

    fn ensure_attached(&mut self, grid: &TerrainGrid) {
        if grid.width() != self.width || grid.height() != self.height {
            warn!(
                "EdgeClassifier: grid is {}x{} but cache is {}x{}, resetting cache",
                grid.width(),
                grid.height(),
                self.width,
                self.height
            );
            self.set_grid(grid);
        }
    }

    /// Classification of (x, y); `None` outside the grid.
    pub fn edge_info(&mut self, grid: &TerrainGrid, x: i32, y: i32) -> Option<CellEdgeInfo> {
        if !grid.in_bounds(x, y) {
            return None;
        }
        self.ensure_attached(grid);
        Some(self.lookup(grid, x as usize, y as usize))
    }

    fn lookup(&mut self, grid: &TerrainGrid, x: usize, y: usize) -> CellEdgeInfo {
        let idx = y * self.width + x;
        if let Some(info) = self.cache[idx] {
            self.stats.hits += 1;
            return info;
        }
        let info = classify_cell(grid, x, y);
        self.cache[idx] = Some(info);
        self.stats.computed += 1;
        info
    }

    /// Every cell with at least one cliff edge, row-major.
    pub fn cliff_cells(&mut self, grid: &TerrainGrid) -> Vec<CellEdgeInfo> {
        if grid.width() == 0 || grid.height() == 0 {
            return Vec::new();
        }
        let all = CellRect::new(0, 0, grid.width() - 1, grid.height() - 1);
        self.scan(grid, all)
    }

    /// Cliff cells within `rect` expanded by one cell on each side, row-major.
    pub fn cliff_cells_in_region(&mut self, grid: &TerrainGrid, rect: CellRect) -> Vec<CellEdgeInfo> {
        if grid.width() == 0 || grid.height() == 0 {
            return Vec::new();
        }
        match rect
            .expand(1)
            .clamp_to(grid.width() - 1, grid.height() - 1)
        {
            Some(scan) => self.scan(grid, scan),
            None => Vec::new(),
        }
    }

    fn scan(&mut self, grid: &TerrainGrid, rect: CellRect) -> Vec<CellEdgeInfo> {
        self.ensure_attached(grid);
        let mut out = Vec::new();
        for (x, y) in rect.iter() {
            let info = self.lookup(grid, x, y);
            if info.has_cliff() {
                out.push(info);
            }
        }
        out
    }
}
