//! Fixed biome palettes: ground colors by elevation band, and one cliff color.
//!
//! Biome state only reaches geometry through these tables, so any biome change
//! requires a full rebuild of both the surface and the cliff mesh.

use bevy::prelude::*;

/// Color used for every platform cell on the surface, regardless of biome or feature.
pub const PLATFORM_COLOR: [f32; 3] = [0.58, 0.55, 0.5];

/// Number of elevation bands in a ground palette.
pub const GROUND_BANDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomeStyle {
    pub id: &'static str,
    /// Ground colors from lowest to highest elevation band.
    pub ground: [[f32; 3]; GROUND_BANDS],
    pub cliff: [f32; 3],
}

pub const TEMPERATE: BiomeStyle = BiomeStyle {
    id: "temperate",
    ground: [
        [0.30, 0.42, 0.22],
        [0.36, 0.50, 0.26],
        [0.45, 0.52, 0.33],
        [0.60, 0.60, 0.55],
    ],
    cliff: [0.45, 0.40, 0.34],
};

pub const DESERT: BiomeStyle = BiomeStyle {
    id: "desert",
    ground: [
        [0.76, 0.64, 0.42],
        [0.82, 0.70, 0.47],
        [0.86, 0.75, 0.54],
        [0.80, 0.66, 0.50],
    ],
    cliff: [0.68, 0.48, 0.32],
};

pub const TUNDRA: BiomeStyle = BiomeStyle {
    id: "tundra",
    ground: [
        [0.52, 0.56, 0.50],
        [0.66, 0.70, 0.68],
        [0.82, 0.85, 0.86],
        [0.94, 0.95, 0.97],
    ],
    cliff: [0.50, 0.52, 0.56],
};

pub const VOLCANIC: BiomeStyle = BiomeStyle {
    id: "volcanic",
    ground: [
        [0.22, 0.20, 0.19],
        [0.28, 0.25, 0.23],
        [0.36, 0.30, 0.27],
        [0.44, 0.26, 0.18],
    ],
    cliff: [0.18, 0.16, 0.15],
};

/// Used when a biome id is not recognized.
pub const NEUTRAL: BiomeStyle = BiomeStyle {
    id: "neutral",
    ground: [
        [0.40, 0.40, 0.40],
        [0.50, 0.50, 0.50],
        [0.60, 0.60, 0.60],
        [0.70, 0.70, 0.70],
    ],
    cliff: [0.45, 0.45, 0.45],
};

static BIOMES: [&BiomeStyle; 4] = [&TEMPERATE, &DESERT, &TUNDRA, &VOLCANIC];

impl BiomeStyle {
    /// Look up a biome by id (case-insensitive). Unknown ids log a warning and
    /// return the neutral palette.
    pub fn for_id(id: &str) -> &'static BiomeStyle {
        match Self::find(id) {
            Some(style) => style,
            None => {
                warn!("BiomeStyle: unknown biome '{}', using neutral palette", id);
                &NEUTRAL
            }
        }
    }

    /// Every built-in biome, in cycling order. Excludes the neutral fallback.
    pub fn all() -> &'static [&'static BiomeStyle] {
        &BIOMES
    }

    pub fn find(id: &str) -> Option<&'static BiomeStyle> {
        BIOMES
            .iter()
            .copied()
            .find(|style| style.id.eq_ignore_ascii_case(id.trim()))
    }

    /// Ground color for an elevation, bucketed into `GROUND_BANDS` equal bands.
    #[inline]
    pub fn ground_color(&self, elevation: u8) -> [f32; 3] {
        let band = (elevation as usize * GROUND_BANDS) / 256;
        self.ground[band.min(GROUND_BANDS - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_biomes_resolve() {
        assert_eq!(BiomeStyle::for_id("desert").id, "desert");
        assert_eq!(BiomeStyle::for_id("Tundra").id, "tundra");
    }

    #[test]
    fn test_unknown_biome_falls_back_to_neutral() {
        let style = BiomeStyle::for_id("swamp-of-doom");
        assert_eq!(style.id, "neutral");
        assert_eq!(style.cliff, NEUTRAL.cliff);
        assert!(BiomeStyle::find("swamp-of-doom").is_none());
    }

    #[test]
    fn test_ground_bands_cover_full_range() {
        assert_eq!(TEMPERATE.ground_color(0), TEMPERATE.ground[0]);
        assert_eq!(TEMPERATE.ground_color(63), TEMPERATE.ground[0]);
        assert_eq!(TEMPERATE.ground_color(64), TEMPERATE.ground[1]);
        assert_eq!(TEMPERATE.ground_color(200), TEMPERATE.ground[3]);
        assert_eq!(TEMPERATE.ground_color(255), TEMPERATE.ground[3]);
    }

    #[test]
    fn test_all_lists_builtin_biomes() {
        let ids: Vec<&str> = BiomeStyle::all().iter().map(|b| b.id).collect();
        assert_eq!(ids, ["temperate", "desert", "tundra", "volcanic"]);
        assert!(BiomeStyle::all().iter().all(|b| BiomeStyle::find(b.id).is_some()));
    }
}
