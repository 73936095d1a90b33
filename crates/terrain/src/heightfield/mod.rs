//! The terrain surface: one vertex per cell corner, two triangles per cell.
//!
//! Topology is fixed for a given grid size, so indices are written once on
//! load and only positions, colors and normals change afterwards. Vertex
//! (i, j) takes its height and color from cell (min(i, w-1), min(j, h-1)).
//!
//! Edits mark a vertex-space rectangle dirty; `update_dirty_region` rewrites
//! exactly that rectangle. A cell edit moves the vertices it owns and the
//! normals of their 4-neighbors, so one vertex of margin on each side makes a
//! partial update identical to a full rebuild.

mod coloring;


pub use coloring::{cell_color, SurfaceStyle};

use bevy::prelude::*;

use crate::config::{elevation_to_y, CELL_SIZE, MAX_GRID_DIMENSION};
use crate::dirty::CellRect;
use crate::error::TerrainError;
use crate::grid::{Cell, TerrainGrid};
use crate::mesh_buffers::GeometryBuffers;

#[derive(Debug, Default)]
pub struct HeightfieldMesh {
    /// Grid size in cells; the vertex lattice is one larger on each axis.
    width: usize,
    height: usize,
    buffers: GeometryBuffers,
    /// Inclusive vertex rectangle awaiting an update.
    dirty: Option<CellRect>,
}

/// Vertex and index counts for a `width x height` grid, rejecting sizes the
/// buffers cannot hold. Cheap enough to run before anything is allocated.
pub(crate) fn buffer_sizes(width: usize, height: usize) -> Result<(usize, usize), TerrainError> {
    let too_large = || TerrainError::GridTooLarge {
        width,
        height,
        max: MAX_GRID_DIMENSION,
    };
    if width > MAX_GRID_DIMENSION || height > MAX_GRID_DIMENSION {
        return Err(too_large());
    }
    let vertices = (width + 1)
        .checked_mul(height + 1)
        .ok_or_else(too_large)?;
    let indices = width
        .checked_mul(height)
        .and_then(|cells| cells.checked_mul(6))
        .ok_or_else(too_large)?;
    if vertices > u32::MAX as usize {
        return Err(too_large());
    }
    Ok((vertices, indices))
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

impl HeightfieldMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate buffers for `grid`, write the static indices and do a full
    /// rebuild. On error the previous buffers are untouched.
    pub fn load_grid(&mut self, grid: &TerrainGrid, style: &SurfaceStyle) -> Result<(), TerrainError> {
        let (width, height) = (grid.width(), grid.height());
        let (vertices, index_count) = buffer_sizes(width, height)?;

        let mut buffers = GeometryBuffers::try_with_capacity(vertices, index_count)?;
        buffers.positions.resize(vertices * 3, 0.0);
        buffers.colors.resize(vertices * 3, 0.0);
        buffers.normals.resize(vertices * 3, 0.0);
        write_indices(&mut buffers.indices, width, height);

        let all = CellRect::new(0, 0, width, height);
        write_vertices(&mut buffers, grid, style, all);

        self.width = width;
        self.height = height;
        self.buffers = buffers;
        self.dirty = None;
        info!(
            "HeightfieldMesh: loaded {}x{} grid ({} vertices, {} triangles)",
            width,
            height,
            vertices,
            index_count / 3
        );
        Ok(())
    }

    /// Mark the vertices around each edited cell for the next update.
    pub fn mark_cells_dirty(&mut self, coords: &[(usize, usize)]) {
        for &(x, y) in coords {
            let Some(rect) = CellRect::single(x, y)
                .expand(1)
                .clamp_to(self.width, self.height)
            else {
                continue;
            };
            self.dirty = Some(match self.dirty {
                Some(current) => current.union(&rect),
                None => rect,
            });
        }
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    /// Pending vertex rectangle, if any.
    pub fn dirty_rect(&self) -> Option<CellRect> {
        self.dirty
    }

    /// Rewrite every vertex in the dirty rectangle and clear it. Returns the
    /// number of vertices written.
    pub fn update_dirty_region(&mut self, grid: &TerrainGrid, style: &SurfaceStyle) -> usize {
        let Some(rect) = self.dirty.take() else {
            return 0;
        };
        if grid.width() != self.width || grid.height() != self.height {
            warn!(
                "HeightfieldMesh: grid is {}x{} but mesh was loaded for {}x{}, skipping update",
                grid.width(),
                grid.height(),
                self.width,
                self.height
            );
            return 0;
        }
        if self.buffers.vertex_count() != (self.width + 1) * (self.height + 1) {
            debug!("HeightfieldMesh: no grid loaded, dropping dirty rect {:?}", rect);
            return 0;
        }
        write_vertices(&mut self.buffers, grid, style, rect);
        rect.area()
    }

    /// Recompute every vertex in place.
    pub fn force_full_rebuild(&mut self, grid: &TerrainGrid, style: &SurfaceStyle) -> usize {
        self.dirty = Some(CellRect::new(0, 0, self.width, self.height));
        self.update_dirty_region(grid, style)
    }

    /// Bilinear surface height at a world position, `0.0` outside the grid.
    pub fn height_at(&self, world_x: f32, world_z: f32) -> f32 {
        if self.width == 0 || self.height == 0 || self.buffers.positions.is_empty() {
            return 0.0;
        }
        let fx = world_x / CELL_SIZE;
        let fz = world_z / CELL_SIZE;
        if !(0.0..=self.width as f32).contains(&fx) || !(0.0..=self.height as f32).contains(&fz) {
            return 0.0;
        }
        let i = (fx.floor() as usize).min(self.width - 1);
        let j = (fz.floor() as usize).min(self.height - 1);
        let tx = fx - i as f32;
        let tz = fz - j as f32;

        let h00 = self.vertex_height(i, j);
        let h10 = self.vertex_height(i + 1, j);
        let h01 = self.vertex_height(i, j + 1);
        let h11 = self.vertex_height(i + 1, j + 1);
        lerp(lerp(h00, h10, tx), lerp(h01, h11, tx), tz)
    }

    #[inline]
    fn vertex_height(&self, i: usize, j: usize) -> f32 {
        self.buffers.positions[(j * (self.width + 1) + i) * 3 + 1]
    }

    pub fn vertex_count(&self) -> usize {
        self.buffers.vertex_count()
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
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
}

// ---------------------------------------------------------------------------
// Buffer writers
// ---------------------------------------------------------------------------

/// Two counter-clockwise (seen from +Y) triangles per cell.
fn write_indices(indices: &mut Vec<u32>, width: usize, height: usize) {
    let stride = (width + 1) as u32;
    for y in 0..height as u32 {
        for x in 0..width as u32 {
            let v00 = y * stride + x;
            let v10 = v00 + 1;
            let v01 = v00 + stride;
            let v11 = v01 + 1;
            indices.extend_from_slice(&[v00, v01, v10, v10, v01, v11]);
        }
    }
}

/// Cell that owns vertex (i, j); `None` for an empty grid.
#[inline]
fn owning_cell(grid: &TerrainGrid, i: usize, j: usize) -> Option<&Cell> {
    if grid.width() == 0 || grid.height() == 0 {
        return None;
    }
    Some(grid.get(i.min(grid.width() - 1), j.min(grid.height() - 1)))
}

#[inline]
fn sample_height(grid: &TerrainGrid, i: usize, j: usize) -> f32 {
    owning_cell(grid, i, j).map_or(0.0, |c| elevation_to_y(c.elevation as f32))
}

fn write_vertices(buf: &mut GeometryBuffers, grid: &TerrainGrid, style: &SurfaceStyle, rect: CellRect) {
    let (w, h) = (grid.width(), grid.height());
    let stride = w + 1;

    for (i, j) in rect.iter() {
        let base = (j * stride + i) * 3;
        let y = sample_height(grid, i, j);
        buf.positions[base] = i as f32 * CELL_SIZE;
        buf.positions[base + 1] = y;
        buf.positions[base + 2] = j as f32 * CELL_SIZE;

        let color = match owning_cell(grid, i, j) {
            Some(cell) => cell_color(cell, style),
            None => style.biome.ground[0],
        };
        buf.colors[base..base + 3].copy_from_slice(&color);

        // Central differences, replicating the border vertex past the edge.
        let left = sample_height(grid, i.saturating_sub(1), j);
        let right = sample_height(grid, (i + 1).min(w), j);
        let up = sample_height(grid, i, j.saturating_sub(1));
        let down = sample_height(grid, i, (j + 1).min(h));
        let n = Vec3::new(left - right, 2.0 * CELL_SIZE, up - down).normalize();
        buf.normals[base..base + 3].copy_from_slice(&n.to_array());
    }
}
