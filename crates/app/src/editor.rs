//! Keyboard-driven demo editing on top of the terrain session.
//!
//! Space raises (Shift+Space lowers) a circular brush under the camera focus,
//! `[`/`]` resize the brush, B cycles biomes, V validates connectivity and R
//! generates a new map.

use bevy::prelude::*;

use rendering::camera::OrbitCamera;
use terrain::biome::BiomeStyle;
use terrain::connectivity::ConnectivityReport;
use terrain::generate::{circle_brush, generate_demo_grid, GeneratorConfig};
use terrain::grid::TerrainGrid;
use terrain::{
    BiomeChanged, CellUpdateBatch, LoadTerrainGrid, TerrainEditSet, TerrainFlushed,
    TerrainSession, ValidateConnectivity,
};

const BRUSH_STRENGTH: i32 = 12;
const MIN_BRUSH_RADIUS: i32 = 1;
const MAX_BRUSH_RADIUS: i32 = 24;

#[derive(Resource, Debug, Clone)]
pub struct EditorState {
    pub generator: GeneratorConfig,
    pub biome_index: usize,
    pub brush_radius: i32,
}

impl EditorState {
    fn new(generator: GeneratorConfig) -> Self {
        Self {
            generator,
            biome_index: 0,
            brush_radius: 4,
        }
    }

    /// Advance to the next built-in biome and return its id.
    fn cycle_biome(&mut self) -> &'static str {
        let biomes = BiomeStyle::all();
        self.biome_index = (self.biome_index + 1) % biomes.len();
        biomes[self.biome_index].id
    }

    fn resize_brush(&mut self, delta: i32) {
        self.brush_radius = (self.brush_radius + delta).clamp(MIN_BRUSH_RADIUS, MAX_BRUSH_RADIUS);
    }
}

/// Brush stroke centered on the cell under a world-space point.
fn stroke_at(grid: &TerrainGrid, world: Vec3, radius: i32, raise: i32) -> CellUpdateBatch {
    let (gx, gy) = TerrainGrid::world_to_grid(world.x, world.z);
    CellUpdateBatch(circle_brush(grid, gx, gy, radius, raise))
}

pub struct EditorPlugin {
    generator: GeneratorConfig,
}

impl EditorPlugin {
    pub fn new(generator: GeneratorConfig) -> Self {
        Self { generator }
    }
}

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(EditorState::new(self.generator.clone()))
            .add_systems(Startup, load_demo_map)
            .add_systems(
                Update,
                (paint_under_focus, editor_hotkeys).before(TerrainEditSet),
            )
            .add_systems(Update, log_terrain_events.after(TerrainEditSet));
    }
}

fn load_demo_map(
    state: Res<EditorState>,
    session: Res<TerrainSession>,
    mut loads: EventWriter<LoadTerrainGrid>,
) {
    let grid = generate_demo_grid(&state.generator, session.features());
    info!(
        "Generated {}x{} demo map (seed {})",
        grid.width(),
        grid.height(),
        state.generator.seed
    );
    loads.send(LoadTerrainGrid(grid));
}

fn paint_under_focus(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<EditorState>,
    orbit: Res<OrbitCamera>,
    session: Res<TerrainSession>,
    mut batches: EventWriter<CellUpdateBatch>,
) {
    if !keys.pressed(KeyCode::Space) {
        return;
    }
    let lowering = keys.pressed(KeyCode::ShiftLeft) || keys.pressed(KeyCode::ShiftRight);
    let raise = if lowering {
        -BRUSH_STRENGTH
    } else {
        BRUSH_STRENGTH
    };
    let stroke = stroke_at(session.grid(), orbit.focus, state.brush_radius, raise);
    if !stroke.0.is_empty() {
        batches.send(stroke);
    }
}

fn editor_hotkeys(
    keys: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<EditorState>,
    session: Res<TerrainSession>,
    mut biomes: EventWriter<BiomeChanged>,
    mut validate: EventWriter<ValidateConnectivity>,
    mut loads: EventWriter<LoadTerrainGrid>,
) {
    if keys.just_pressed(KeyCode::BracketLeft) {
        state.resize_brush(-1);
    }
    if keys.just_pressed(KeyCode::BracketRight) {
        state.resize_brush(1);
    }
    if keys.just_pressed(KeyCode::KeyB) {
        let id = state.cycle_biome();
        biomes.send(BiomeChanged(id.to_string()));
    }
    if keys.just_pressed(KeyCode::KeyV) {
        validate.send(ValidateConnectivity);
    }
    if keys.just_pressed(KeyCode::KeyR) {
        state.generator.seed = state.generator.seed.wrapping_add(1);
        let grid = generate_demo_grid(&state.generator, session.features());
        info!("Regenerated demo map with seed {}", state.generator.seed);
        loads.send(LoadTerrainGrid(grid));
    }
}

fn log_terrain_events(
    mut flushed: EventReader<TerrainFlushed>,
    mut reports: EventReader<ConnectivityReport>,
) {
    for TerrainFlushed(report) in flushed.read() {
        debug!(
            "Flush: full={} rect={:?} vertices={}",
            report.full_rebuild, report.dirty_rect, report.vertices_updated
        );
    }
    for report in reports.read() {
        if report.is_connected() {
            info!("Walkable area is connected ({} cells)", report.walkable_cells);
        } else {
            warn!(
                "Walkable area split into {} regions; {} below minimum size",
                report.regions,
                report.small_regions.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_biome_cycle_wraps() {
        let mut state = EditorState::new(GeneratorConfig::default());
        let count = BiomeStyle::all().len();
        let ids: Vec<&str> = (0..count).map(|_| state.cycle_biome()).collect();
        assert_eq!(ids.last(), Some(&"temperate"));
        assert_eq!(ids[0], "desert");
    }

    #[test]
    fn test_brush_radius_clamps() {
        let mut state = EditorState::new(GeneratorConfig::default());
        for _ in 0..100 {
            state.resize_brush(1);
        }
        assert_eq!(state.brush_radius, MAX_BRUSH_RADIUS);
        for _ in 0..100 {
            state.resize_brush(-1);
        }
        assert_eq!(state.brush_radius, MIN_BRUSH_RADIUS);
    }

    #[test]
    fn test_stroke_targets_cell_under_focus() {
        let grid = TerrainGrid::new(20, 20);
        let stroke = stroke_at(&grid, Vec3::new(5.5, 0.0, 7.2), 0, 10);
        assert_eq!(stroke.0.len(), 1);
        assert_eq!((stroke.0[0].x, stroke.0[0].y), (5, 7));
    }

    #[test]
    fn test_stroke_off_map_is_empty() {
        let grid = TerrainGrid::new(4, 4);
        let stroke = stroke_at(&grid, Vec3::new(-50.0, 0.0, -50.0), 2, 10);
        assert!(stroke.0.is_empty());
    }
}
