//! Flat attribute buffers shared by the surface and cliff meshes.
//!
//! Three floats per vertex for positions, colors (RGB) and normals; `u32`
//! triangle-list indices. The renderer converts these into a Bevy `Mesh`.

use crate::error::{try_alloc, TerrainError};

// ---------------------------------------------------------------------------
// Color helpers
// ---------------------------------------------------------------------------

#[inline]
pub(crate) fn scale_color(c: [f32; 3], factor: f32) -> [f32; 3] {
    [c[0] * factor, c[1] * factor, c[2] * factor]
}

#[inline]
pub(crate) fn tint_color(c: [f32; 3], tint: [f32; 3]) -> [f32; 3] {
    [
        (c[0] * tint[0]).min(1.0),
        (c[1] * tint[1]).min(1.0),
        (c[2] * tint[2]).min(1.0),
    ]
}

// ---------------------------------------------------------------------------
// GeometryBuffers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryBuffers {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

impl GeometryBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty buffers with room for exactly `vertices` vertices and `indices` indices.
    pub fn try_with_capacity(vertices: usize, indices: usize) -> Result<Self, TerrainError> {
        let floats = vertices
            .checked_mul(3)
            .ok_or(TerrainError::AllocationFailed {
                buffer: "positions",
                len: vertices,
            })?;
        Ok(Self {
            positions: try_alloc("positions", floats)?,
            colors: try_alloc("colors", floats)?,
            normals: try_alloc("normals", floats)?,
            indices: try_alloc("indices", indices)?,
        })
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append one vertex and return its index.
    #[inline]
    pub fn push_vertex(&mut self, position: [f32; 3], color: [f32; 3], normal: [f32; 3]) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions.extend_from_slice(&position);
        self.colors.extend_from_slice(&color);
        self.normals.extend_from_slice(&normal);
        index
    }

    #[inline]
    pub fn position(&self, vertex: usize) -> [f32; 3] {
        let i = vertex * 3;
        [self.positions[i], self.positions[i + 1], self.positions[i + 2]]
    }

    #[inline]
    pub fn color(&self, vertex: usize) -> [f32; 3] {
        let i = vertex * 3;
        [self.colors[i], self.colors[i + 1], self.colors[i + 2]]
    }

    #[inline]
    pub fn normal(&self, vertex: usize) -> [f32; 3] {
        let i = vertex * 3;
        [self.normals[i], self.normals[i + 1], self.normals[i + 2]]
    }

    /// Drop all contents and give the memory back.
    pub fn release(&mut self) {
        *self = Self::default();
    }
}
