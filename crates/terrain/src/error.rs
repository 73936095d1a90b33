// ---------------------------------------------------------------------------
// TerrainError: the fatal paths of grid loading and geometry rebuilds
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors surfaced to the caller of a load or full rebuild.
///
/// Bounds problems and unknown feature/biome ids are never errors: they are
/// clamped, ignored, or defaulted where they occur. Only conditions that would
/// leave a mesh half-built end up here.
#[derive(Debug)]
pub enum TerrainError {
    /// Grid dimensions exceed `MAX_GRID_DIMENSION` or overflow buffer sizing.
    GridTooLarge {
        width: usize,
        height: usize,
        max: usize,
    },
    /// The allocator refused a buffer reservation.
    AllocationFailed { buffer: &'static str, len: usize },
    /// Cell storage length disagrees with the declared dimensions.
    InvalidGrid {
        width: usize,
        height: usize,
        cells: usize,
    },
    /// The feature table document could not be parsed.
    FeatureTable(String),
}

impl fmt::Display for TerrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerrainError::GridTooLarge { width, height, max } => write!(
                f,
                "Grid too large: {width}x{height} exceeds the {max} cell limit per side"
            ),
            TerrainError::AllocationFailed { buffer, len } => {
                write!(f, "Allocation failed: {buffer} buffer of {len} elements")
            }
            TerrainError::InvalidGrid {
                width,
                height,
                cells,
            } => write!(
                f,
                "Invalid grid: {width}x{height} needs {} cells, got {cells}",
                width * height
            ),
            TerrainError::FeatureTable(msg) => write!(f, "Feature table error: {msg}"),
        }
    }
}

impl std::error::Error for TerrainError {}

impl From<serde_json::Error> for TerrainError {
    fn from(e: serde_json::Error) -> Self {
        TerrainError::FeatureTable(e.to_string())
    }
}

/// Reserve exactly `len` elements in a fresh vector, mapping allocator
/// refusal to `TerrainError::AllocationFailed`.
pub(crate) fn try_alloc<T>(buffer: &'static str, len: usize) -> Result<Vec<T>, TerrainError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| TerrainError::AllocationFailed { buffer, len })?;
    Ok(v)
}
