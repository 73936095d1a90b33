/// World-space edge length of one grid cell (X and Z).
pub const CELL_SIZE: f32 = 1.0;

/// World units per elevation step. Elevation [0,255] maps to [0, 25.5].
pub const HEIGHT_SCALE: f32 = 0.1;

/// Minimum elevation difference between two platform cells that produces a cliff.
pub const CLIFF_THRESHOLD: i16 = 40;

/// Brightness factor applied to the bottom vertices of a cliff face.
pub const CLIFF_BOTTOM_SHADE: f32 = 0.7;

pub const MIN_ELEVATION: u8 = 0;
pub const MAX_ELEVATION: u8 = 255;

/// Largest grid edge accepted by a load. Larger grids fail instead of allocating.
pub const MAX_GRID_DIMENSION: usize = 4096;

/// Default grid size used by the demo binary and benches.
pub const DEFAULT_GRID_WIDTH: usize = 256;
pub const DEFAULT_GRID_HEIGHT: usize = 256;

/// Biome used when a session starts without an explicit one.
pub const DEFAULT_BIOME: &str = "temperate";

/// Convert an integer elevation into a world-space Y coordinate.
#[inline]
pub fn elevation_to_y(elevation: f32) -> f32 {
    elevation * HEIGHT_SCALE
}

/// Clamp an arbitrary integer elevation into the storable range.
#[inline]
pub fn clamp_elevation(value: i32) -> u8 {
    value.clamp(MIN_ELEVATION as i32, MAX_ELEVATION as i32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_elevation_bounds() {
        assert_eq!(clamp_elevation(-20), 0);
        assert_eq!(clamp_elevation(300), 255);
        assert_eq!(clamp_elevation(117), 117);
    }

    #[test]
    fn test_threshold_fits_elevation_range() {
        assert!(CLIFF_THRESHOLD > 0);
        assert!((CLIFF_THRESHOLD as i32) < MAX_ELEVATION as i32);
    }
}
