//! Bevy integration: the session as a resource, driven by events.
//!
//! All systems run chained in `Update` inside `TerrainEditSet`, so every batch
//! received in a frame is applied before the single flush of that frame.
//! Renderers order themselves `.after(TerrainEditSet)`.

use bevy::prelude::*;

use crate::connectivity::{ConnectivityReport, GridValidator, WalkableRegions};
use crate::features::FeatureTable;
use crate::grid::{CellUpdate, TerrainGrid};
use crate::session::{FlushReport, TerrainSession};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Replace the session grid wholesale.
#[derive(Event, Debug, Clone)]
pub struct LoadTerrainGrid(pub TerrainGrid);

/// One paint batch, applied in order.
#[derive(Event, Debug, Clone, Default)]
pub struct CellUpdateBatch(pub Vec<CellUpdate>);

/// Switch to another biome palette by id.
#[derive(Event, Debug, Clone)]
pub struct BiomeChanged(pub String);

/// Ask the active validator to check the current grid. Several requests in
/// one frame produce one report.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ValidateConnectivity;

/// Sent after a flush that changed geometry.
#[derive(Event, Debug, Clone, Copy)]
pub struct TerrainFlushed(pub FlushReport);

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Validator run on `ValidateConnectivity`.
#[derive(Resource)]
pub struct ActiveValidator(pub Box<dyn GridValidator>);

impl Default for ActiveValidator {
    fn default() -> Self {
        Self(Box::new(WalkableRegions::default()))
    }
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TerrainEditSet;

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

fn load_requested_grids(mut requests: EventReader<LoadTerrainGrid>, mut session: ResMut<TerrainSession>) {
    // Only the last load of a frame matters.
    let Some(LoadTerrainGrid(grid)) = requests.read().last() else {
        return;
    };
    if let Err(e) = session.load_grid(grid.clone()) {
        error!("Terrain load failed: {}", e);
    }
}

fn apply_biome_changes(mut changes: EventReader<BiomeChanged>, mut session: ResMut<TerrainSession>) {
    for BiomeChanged(id) in changes.read() {
        session.set_biome(id);
    }
}

fn apply_cell_batches(mut batches: EventReader<CellUpdateBatch>, mut session: ResMut<TerrainSession>) {
    for CellUpdateBatch(updates) in batches.read() {
        session.apply_cell_updates(updates);
    }
}

fn flush_session(mut session: ResMut<TerrainSession>, mut flushed: EventWriter<TerrainFlushed>) {
    if !session.has_pending_changes() {
        return;
    }
    match session.flush() {
        Ok(report) if !report.is_noop() => {
            flushed.send(TerrainFlushed(report));
        }
        Ok(_) => {}
        Err(e) => error!("Terrain flush failed: {}", e),
    }
}

fn run_validation(
    mut requests: EventReader<ValidateConnectivity>,
    session: Res<TerrainSession>,
    validator: Res<ActiveValidator>,
    mut reports: EventWriter<ConnectivityReport>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();
    let report = validator.0.validate(session.grid());
    info!(
        "Connectivity: {} walkable cells in {} regions (largest {})",
        report.walkable_cells, report.regions, report.largest_region
    );
    reports.send(report);
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Registers the session, the edit events and the per-frame flush.
///
/// A `FeatureTable` resource inserted before the plugin seeds the session;
/// otherwise the built-in table is used.
pub struct TerrainEditPlugin;

impl Plugin for TerrainEditPlugin {
    fn build(&self, app: &mut App) {
        let features = app
            .world()
            .get_resource::<FeatureTable>()
            .cloned()
            .unwrap_or_default();

        app.insert_resource(TerrainSession::new(features))
            .init_resource::<ActiveValidator>()
            .add_event::<LoadTerrainGrid>()
            .add_event::<CellUpdateBatch>()
            .add_event::<BiomeChanged>()
            .add_event::<ValidateConnectivity>()
            .add_event::<ConnectivityReport>()
            .add_event::<TerrainFlushed>()
            .add_systems(
                Update,
                (
                    load_requested_grids,
                    apply_biome_changes,
                    apply_cell_batches,
                    flush_session,
                    run_validation,
                )
                    .chain()
                    .in_set(TerrainEditSet),
            );
    }
}
