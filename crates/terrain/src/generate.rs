//! Deterministic demo maps and brush strokes for the editor binary, benches
//! and tests.

use bevy::log::warn;
use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{clamp_elevation, CLIFF_THRESHOLD, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH};
use crate::features::{
    FeatureTable, FEATURE_DEEP_WATER, FEATURE_FOREST, FEATURE_GRASS, FEATURE_GROUND, FEATURE_ROCK,
    FEATURE_SHALLOW_WATER,
};
use crate::grid::{CellPatch, CellUpdate, TerrainGrid};

// ---------------------------------------------------------------------------
// Generator settings
// ---------------------------------------------------------------------------

const NOISE_FREQUENCY: f32 = 0.02;
const NOISE_OCTAVES: i32 = 4;
/// Highest elevation the noise base layer reaches. Plateaus rise above it.
const LOWLAND_MAX: f32 = 110.0;
const TEXTURE_VARIANTS: u8 = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub width: usize,
    pub height: usize,
    /// Number of raised rectangular plateaus.
    pub plateaus: usize,
    /// Probability that a plateau gets a ramp on one side.
    pub ramp_chance: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            plateaus: 24,
            ramp_chance: 0.6,
        }
    }
}

impl GeneratorConfig {
    /// `ramp_chance` as a usable probability. Out-of-range values clamp and NaN
    /// means no ramps.
    pub fn ramp_probability(&self) -> f64 {
        if self.ramp_chance.is_nan() {
            0.0
        } else {
            self.ramp_chance.clamp(0.0, 1.0)
        }
    }
}

fn feature_for(normalized: f32) -> u16 {
    match normalized {
        n if n < 0.18 => FEATURE_DEEP_WATER,
        n if n < 0.28 => FEATURE_SHALLOW_WATER,
        n if n < 0.50 => FEATURE_GRASS,
        n if n < 0.72 => FEATURE_FOREST,
        n if n < 0.90 => FEATURE_GROUND,
        _ => FEATURE_ROCK,
    }
}

/// Build a map: fBm lowlands with features by height, then plateaus with
/// optional ramps scattered on top.
pub fn generate_demo_grid(config: &GeneratorConfig, features: &FeatureTable) -> TerrainGrid {
    let (width, height) = (config.width, config.height);
    let mut grid = TerrainGrid::new(width, height);
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let mut noise = FastNoiseLite::with_seed(config.seed as i32);
    noise.set_noise_type(Some(NoiseType::OpenSimplex2));
    noise.set_frequency(Some(NOISE_FREQUENCY));
    noise.set_fractal_type(Some(FractalType::FBm));
    noise.set_fractal_octaves(Some(NOISE_OCTAVES));

    for y in 0..height {
        for x in 0..width {
            let raw = noise.get_noise_2d(x as f32, y as f32);
            let normalized = ((raw + 1.0) * 0.5).clamp(0.0, 1.0);
            let feature = feature_for(normalized);
            let cell = grid.get_mut(x, y);
            cell.elevation = clamp_elevation((normalized * LOWLAND_MAX) as i32);
            cell.feature = feature;
            cell.walkable = features.resolve(feature).walkable;
            cell.texture_variant = rng.gen_range(0..TEXTURE_VARIANTS);
        }
    }

    if width < 4 || height < 4 {
        return grid;
    }

    let ramp_chance = config.ramp_probability();
    if ramp_chance != config.ramp_chance {
        warn!(
            "Generator ramp_chance {} is not a probability, using {}",
            config.ramp_chance, ramp_chance
        );
    }

    let mut updates = Vec::new();
    for _ in 0..config.plateaus {
        let pw = rng.gen_range(3..=(width / 4).clamp(3, 12));
        let ph = rng.gen_range(3..=(height / 4).clamp(3, 12));
        let x0 = rng.gen_range(0..=width - pw);
        let y0 = rng.gen_range(0..=height - ph);
        let base = grid.get(x0, y0).elevation as i32;
        let rise = rng.gen_range(CLIFF_THRESHOLD as i32..=3 * CLIFF_THRESHOLD as i32);
        let top = clamp_elevation(base + rise);

        for y in y0..y0 + ph {
            for x in x0..x0 + pw {
                updates.push(CellUpdate::new(
                    x as i32,
                    y as i32,
                    CellPatch::elevation(top)
                        .with_platform(true)
                        .with_ramp(false)
                        .with_feature(FEATURE_GROUND),
                ));
            }
        }

        // A ramp cell just south of the plateau, halfway up.
        if rng.gen_bool(ramp_chance) && y0 + ph < height {
            let rx = x0 + pw / 2;
            let ry = y0 + ph;
            let below = grid.get(rx, ry).elevation as i32;
            updates.push(CellUpdate::new(
                rx as i32,
                ry as i32,
                CellPatch::elevation_clamped((below + top as i32) / 2)
                    .with_ramp(true)
                    .with_platform(false)
                    .with_walkable(true),
            ));
        }
    }
    grid.apply_cell_updates(&updates, features);
    grid
}

/// Circular brush: every in-grid cell within `radius` of (cx, cy) moves by
/// `raise` elevation steps, falling off linearly toward the rim.
pub fn circle_brush(grid: &TerrainGrid, cx: i32, cy: i32, radius: i32, raise: i32) -> Vec<CellUpdate> {
    let mut updates = Vec::new();
    let r2 = (radius * radius) as f32;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let d2 = (dx * dx + dy * dy) as f32;
            if d2 > r2 {
                continue;
            }
            let (x, y) = (cx + dx, cy + dy);
            let Some(cell) = grid.get_checked(x, y) else {
                continue;
            };
            let falloff = 1.0 - d2.sqrt() / (radius as f32 + 1.0);
            let step = (raise as f32 * falloff).round() as i32;
            updates.push(CellUpdate::new(
                x,
                y,
                CellPatch::elevation_clamped(cell.elevation as i32 + step),
            ));
        }
    }
    updates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::{GridValidator, WalkableRegions};

    fn small_config(seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            seed,
            width: 48,
            height: 40,
            plateaus: 6,
            ramp_chance: 1.0,
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let features = FeatureTable::default();
        let a = generate_demo_grid(&small_config(5), &features);
        let b = generate_demo_grid(&small_config(5), &features);
        assert_eq!(a, b);
        let c = generate_demo_grid(&small_config(6), &features);
        assert_ne!(a, c);
    }

    #[test]
    fn test_generated_map_has_plateaus_and_ramps() {
        let features = FeatureTable::default();
        let grid = generate_demo_grid(&small_config(1), &features);
        assert_eq!((grid.width(), grid.height()), (48, 40));
        assert!(grid.cells().iter().any(|c| c.platform));
        assert!(grid.cells().iter().any(|c| c.ramp));
        assert!(grid
            .cells()
            .iter()
            .all(|c| c.walkable == features.resolve(c.feature).walkable || c.ramp));
    }

    #[test]
    fn test_generated_map_validates() {
        let features = FeatureTable::default();
        let grid = generate_demo_grid(&small_config(3), &features);
        let report = WalkableRegions::default().validate(&grid);
        assert!(report.walkable_cells > 0);
        assert!(report.regions >= 1);
    }

    #[test]
    fn test_out_of_range_ramp_chance_is_clamped() {
        let features = FeatureTable::default();
        for (chance, expected) in [(3.0, 1.0), (-1.0, 0.0), (f64::NAN, 0.0), (0.25, 0.25)] {
            let config = GeneratorConfig {
                ramp_chance: chance,
                ..small_config(2)
            };
            assert_eq!(config.ramp_probability(), expected);
        }

        let always = GeneratorConfig {
            ramp_chance: 3.0,
            ..small_config(1)
        };
        let grid = generate_demo_grid(&always, &features);
        assert_eq!(grid, generate_demo_grid(&small_config(1), &features));

        let never = GeneratorConfig {
            ramp_chance: -1.0,
            ..small_config(2)
        };
        let grid = generate_demo_grid(&never, &features);
        assert!(grid.cells().iter().all(|c| !c.ramp));
    }

    #[test]
    fn test_tiny_map_skips_plateaus() {
        let config = GeneratorConfig {
            width: 3,
            height: 2,
            ..small_config(9)
        };
        let grid = generate_demo_grid(&config, &FeatureTable::default());
        assert!(grid.cells().iter().all(|c| !c.platform));
    }

    #[test]
    fn test_circle_brush_clips_to_grid() {
        let grid = TerrainGrid::new(10, 10);
        let stroke = circle_brush(&grid, 0, 0, 2, 50);
        assert!(!stroke.is_empty());
        assert!(stroke.iter().all(|u| grid.in_bounds(u.x, u.y)));
        let center = stroke.iter().find(|u| (u.x, u.y) == (0, 0)).unwrap();
        assert_eq!(center.patch.elevation, Some(50));
    }

    #[test]
    fn test_circle_brush_lowering_clamps_at_zero() {
        let grid = TerrainGrid::new(5, 5);
        let stroke = circle_brush(&grid, 2, 2, 1, -30);
        assert!(stroke.iter().all(|u| u.patch.elevation == Some(0)));
    }
}
