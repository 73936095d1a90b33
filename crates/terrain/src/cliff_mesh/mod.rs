//! Cliff-face geometry built from classified edges.
//!
//! Every cliff edge is owned by its higher side: a cell emits a wall only on
//! edges where it drops (`EdgeInfo::is_drop`), so the shared edge of two
//! platforms produces one face, not two. Convex corners where both edges drop
//! get a seam filler.
//!
//! Buffers are sized to the exact quad count on every rebuild. A region update
//! invalidates the classifier around the edit and then rebuilds everything.

mod quads;


pub use quads::{corner_normal, edge_normal};

use bevy::prelude::*;

use crate::biome::BiomeStyle;
use crate::config::elevation_to_y;
use crate::dirty::CellRect;
use crate::edges::{CellEdgeInfo, CornerKind, EdgeClassifier};
use crate::error::TerrainError;
use crate::grid::{Corner, Direction, TerrainGrid};
use crate::mesh_buffers::GeometryBuffers;

/// Summary of one cliff rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CliffBuildStats {
    /// Cells with at least one cliff edge (either side of the drop).
    pub cliff_cells: usize,
    pub edge_quads: usize,
    pub corner_quads: usize,
}

impl CliffBuildStats {
    #[inline]
    pub fn quads(&self) -> usize {
        self.edge_quads + self.corner_quads
    }
}

#[derive(Debug, Default)]
pub struct CliffGeometryBuilder {
    buffers: GeometryBuffers,
    stats: CliffBuildStats,
    /// Makes the next rebuild report an allocation failure.
    #[cfg(test)]
    fail_next_build: bool,
}

/// Quads a cell contributes: (edge quads, corner quads).
fn quads_for(info: &CellEdgeInfo) -> (usize, usize) {
    let edges = info.edges.iter().filter(|e| e.is_drop()).count();
    let corners = Corner::ALL
        .iter()
        .filter(|&&c| corner_drops(info, c))
        .count();
    (edges, corners)
}

fn corner_drops(info: &CellEdgeInfo, corner: Corner) -> bool {
    let (v, h) = corner.edges();
    info.corner(corner) == CornerKind::Convex && info.edge(v).is_drop() && info.edge(h).is_drop()
}

impl CliffGeometryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild all cliff geometry from the grid.
    ///
    /// The new buffers are allocated and filled before the old ones are
    /// replaced, so an allocation failure leaves the previous mesh in place.
    pub fn build_from_grid(
        &mut self,
        grid: &TerrainGrid,
        classifier: &mut EdgeClassifier,
        style: &BiomeStyle,
    ) -> Result<CliffBuildStats, TerrainError> {
        let cells = classifier.cliff_cells(grid);

        let mut stats = CliffBuildStats {
            cliff_cells: cells.len(),
            ..Default::default()
        };
        for info in &cells {
            let (edges, corners) = quads_for(info);
            stats.edge_quads += edges;
            stats.corner_quads += corners;
        }

        let quads = stats.quads();
        #[cfg(test)]
        if std::mem::take(&mut self.fail_next_build) {
            return Err(TerrainError::AllocationFailed {
                buffer: "positions",
                len: quads * 4 * 3,
            });
        }
        let mut buffers = GeometryBuffers::try_with_capacity(quads * 4, quads * 6)?;
        for info in &cells {
            emit_cell(&mut buffers, grid, info, style.cliff);
        }

        self.buffers = buffers;
        self.stats = stats;
        Ok(stats)
    }

    /// Invalidate the classifier around `rect` and rebuild.
    pub fn update_region(
        &mut self,
        grid: &TerrainGrid,
        classifier: &mut EdgeClassifier,
        style: &BiomeStyle,
        rect: CellRect,
    ) -> Result<CliffBuildStats, TerrainError> {
        classifier.invalidate_rect(rect.expand(1));
        self.build_from_grid(grid, classifier, style)
    }

    #[cfg(test)]
    pub(crate) fn fail_next_build(&mut self) {
        self.fail_next_build = true;
    }

    /// Release all buffers.
    pub fn dispose(&mut self) {
        self.buffers.release();
        self.stats = CliffBuildStats::default();
        debug!("CliffGeometryBuilder: buffers released");
    }

    pub fn buffers(&self) -> &GeometryBuffers {
        &self.buffers
    }

    pub fn positions(&self) -> &[f32] {
        &self.buffers.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.buffers.colors
    }

    pub fn normals(&self) -> &[f32] {
        &self.buffers.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.buffers.indices
    }

    pub fn stats(&self) -> CliffBuildStats {
        self.stats
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.buffers.vertex_count() / 4
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

fn emit_cell(buf: &mut GeometryBuffers, grid: &TerrainGrid, info: &CellEdgeInfo, color: [f32; 3]) {
    let elevation = grid.get(info.x, info.y).elevation as i16;
    let top = elevation_to_y(elevation as f32);
    let bottom_of = |dir: Direction| elevation_to_y((elevation - info.edge(dir).elevation_delta) as f32);

    for dir in Direction::ALL {
        if info.edge(dir).is_drop() {
            quads::push_edge_quad(buf, info.x, info.y, dir, top, bottom_of(dir), color);
        }
    }
    for corner in Corner::ALL {
        if corner_drops(info, corner) {
            let (v, h) = corner.edges();
            let bottom = bottom_of(v).min(bottom_of(h));
            quads::push_corner_quad(buf, info.x, info.y, corner, top, bottom, color);
        }
    }
}
