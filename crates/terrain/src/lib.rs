//! Incremental terrain editing: a cell grid kept in sync with a surface mesh
//! and a cliff mesh while it is painted.
//!
//! `TerrainSession` owns the grid and all derived state. Edits go in through
//! `apply_cell_updates` (or the `CellUpdateBatch` event) and geometry is
//! brought up to date by one `flush` per frame.

pub mod biome;
pub mod cliff_mesh;
pub mod config;
pub mod connectivity;
pub mod dirty;
pub mod edges;
pub mod error;
pub mod features;
pub mod generate;
pub mod grid;
pub mod heightfield;
pub mod mesh_buffers;
pub mod plugin;
pub mod session;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use error::TerrainError;
pub use plugin::{
    ActiveValidator, BiomeChanged, CellUpdateBatch, LoadTerrainGrid, TerrainEditPlugin,
    TerrainEditSet, TerrainFlushed, ValidateConnectivity,
};
pub use session::{FlushReport, TerrainSession};
