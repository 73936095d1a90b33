use crate::biome::{BiomeStyle, PLATFORM_COLOR};
use crate::features::FeatureTable;
use crate::grid::Cell;
use crate::mesh_buffers::{scale_color, tint_color};

/// Brightness step between texture variants.
const VARIANT_JITTER: f32 = 0.03;
/// Brightness steps by `variant % 5`; variant 0 is the unmodified palette.
const VARIANT_STEPS: [f32; 5] = [0.0, 1.0, -1.0, 2.0, -2.0];

/// Palette inputs for surface vertex colors.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceStyle<'a> {
    pub biome: &'a BiomeStyle,
    pub features: &'a FeatureTable,
}

impl<'a> SurfaceStyle<'a> {
    pub fn new(biome: &'a BiomeStyle, features: &'a FeatureTable) -> Self {
        Self { biome, features }
    }
}

#[inline]
pub(crate) fn variant_brightness(variant: u8) -> f32 {
    1.0 + VARIANT_STEPS[variant as usize % VARIANT_STEPS.len()] * VARIANT_JITTER
}

/// Surface color of a cell: elevation band, times feature tint, times variant
/// jitter. Platforms ignore all three.
pub fn cell_color(cell: &Cell, style: &SurfaceStyle) -> [f32; 3] {
    if cell.platform {
        return PLATFORM_COLOR;
    }
    let base = style.biome.ground_color(cell.elevation);
    let tint = style.features.resolve(cell.feature).tint;
    scale_color(
        tint_color(base, tint),
        variant_brightness(cell.texture_variant),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{DESERT, TEMPERATE};
    use crate::features::{FeatureDef, FEATURE_GROUND};

    #[test]
    fn test_platform_color_wins() {
        let features = FeatureTable::default();
        let style = SurfaceStyle::new(&DESERT, &features);
        let cell = Cell {
            texture_variant: 3,
            ..Cell::platform(200)
        };
        assert_eq!(cell_color(&cell, &style), PLATFORM_COLOR);
    }

    #[test]
    fn test_plain_ground_uses_band_color() {
        let features = FeatureTable::default();
        let style = SurfaceStyle::new(&TEMPERATE, &features);
        let cell = Cell {
            elevation: 130,
            texture_variant: 5,
            ..Default::default()
        };
        assert_eq!(cell_color(&cell, &style), TEMPERATE.ground[2]);
    }

    #[test]
    fn test_feature_tint_applies() {
        let mut features = FeatureTable::empty();
        features.insert(FEATURE_GROUND, FeatureDef::new("ground", true, [0.5, 1.0, 1.0]));
        let style = SurfaceStyle::new(&TEMPERATE, &features);
        let cell = Cell::default();
        let color = cell_color(&cell, &style);
        assert!((color[0] - TEMPERATE.ground[0][0] * 0.5).abs() < 1e-6);
        assert!((color[1] - TEMPERATE.ground[0][1]).abs() < 1e-6);
    }

    #[test]
    fn test_variant_brightness_is_small_and_centered() {
        assert_eq!(variant_brightness(0), 1.0);
        assert_eq!(variant_brightness(10), 1.0);
        assert!(variant_brightness(1) > 1.0);
        assert!(variant_brightness(4) < 1.0);
        for v in 0..=255u8 {
            assert!((variant_brightness(v) - 1.0).abs() <= 0.061);
        }
    }
}
