//! # TestTerrain: headless harness for the edit plugin
//!
//! Wraps `bevy::app::App` + `MinimalPlugins` + `TerrainEditPlugin` so tests and
//! benches can drive the session through events exactly as the editor does.

use bevy::app::App;
use bevy::ecs::event::{EventRegistry, Events, ShouldUpdateEvents};
use bevy::prelude::*;

use crate::connectivity::ConnectivityReport;
use crate::grid::{Cell, CellPatch, CellUpdate, TerrainGrid};
use crate::plugin::{
    BiomeChanged, CellUpdateBatch, LoadTerrainGrid, TerrainEditPlugin, TerrainFlushed,
    ValidateConnectivity,
};
use crate::session::{FlushReport, TerrainSession};

pub struct TestTerrain {
    app: App,
}

impl Default for TestTerrain {
    fn default() -> Self {
        Self::new(16, 16)
    }
}

impl TestTerrain {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Flat, walkable `width x height` ground, already loaded and flushed.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_grid(TerrainGrid::new(width, height))
    }

    /// Load an arbitrary grid and run one frame.
    pub fn with_grid(grid: TerrainGrid) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(TerrainEditPlugin);
        app.world_mut().send_event(LoadTerrainGrid(grid));
        let mut terrain = Self { app };
        terrain.tick(1);
        terrain
    }

    // -----------------------------------------------------------------------
    // World Setup (builder pattern; consumes and returns Self)
    // -----------------------------------------------------------------------

    /// Raise an inclusive rectangle into a platform at `elevation` and flush.
    pub fn with_platform_rect(
        mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        elevation: u8,
    ) -> Self {
        let mut updates = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                updates.push(CellUpdate::new(
                    x,
                    y,
                    CellPatch::elevation(elevation).with_platform(true),
                ));
            }
        }
        self.paint(updates);
        self.tick(1);
        self
    }

    pub fn with_biome(mut self, id: &str) -> Self {
        self.app
            .world_mut()
            .send_event(BiomeChanged(id.to_string()));
        self.tick(1);
        self
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Queue one paint batch for the next frame.
    pub fn paint(&mut self, updates: Vec<CellUpdate>) {
        self.app.world_mut().send_event(CellUpdateBatch(updates));
    }

    pub fn request_validation(&mut self) {
        self.app.world_mut().send_event(ValidateConnectivity);
    }

    /// Run N frames. Event buffers swap every frame, so the report queries
    /// below see only the last frame's events.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            // MinimalPlugins otherwise swaps only when FixedUpdate runs.
            self.app
                .world_mut()
                .resource_mut::<EventRegistry>()
                .should_update = ShouldUpdateEvents::Always;
            self.app.update();
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn session(&self) -> &TerrainSession {
        self.app.world().resource::<TerrainSession>()
    }

    pub fn session_mut(&mut self) -> Mut<'_, TerrainSession> {
        self.app.world_mut().resource_mut::<TerrainSession>()
    }

    pub fn grid(&self) -> &TerrainGrid {
        self.session().grid()
    }

    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        self.grid().get(x, y)
    }

    /// Flush reports sent during the last frame.
    pub fn flush_reports(&self) -> Vec<FlushReport> {
        let events = self.app.world().resource::<Events<TerrainFlushed>>();
        events.iter_current_update_events().map(|e| e.0).collect()
    }

    /// Connectivity reports sent during the last frame.
    pub fn connectivity_reports(&self) -> Vec<ConnectivityReport> {
        let events = self.app.world().resource::<Events<ConnectivityReport>>();
        events.iter_current_update_events().cloned().collect()
    }
}
