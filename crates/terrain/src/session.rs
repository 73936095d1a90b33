//! The editing session: owns the grid and every derived structure, and
//! sequences a flush.
//!
//! Edits write the grid immediately and only record what they touched. Derived
//! geometry is brought up to date by `flush`, which the plugin runs once per
//! frame.

use bevy::prelude::*;

use crate::biome::BiomeStyle;
use crate::cliff_mesh::{CliffBuildStats, CliffGeometryBuilder};
use crate::config::DEFAULT_BIOME;
use crate::dirty::{CellRect, DirtyRegion};
use crate::edges::{CellEdgeInfo, ClassifierStats, EdgeClassifier};
use crate::error::TerrainError;
use crate::features::FeatureTable;
use crate::grid::{CellUpdate, TerrainGrid};
use crate::heightfield::{buffer_sizes, HeightfieldMesh, SurfaceStyle};

/// What one flush did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Both meshes were rebuilt from scratch (biome or feature table change).
    pub full_rebuild: bool,
    /// Cell rectangle covered by the flush, already clamped to the grid.
    pub dirty_rect: Option<CellRect>,
    pub vertices_updated: usize,
    /// Set when the cliff mesh was rebuilt.
    pub cliffs: Option<CliffBuildStats>,
}

impl FlushReport {
    pub fn is_noop(&self) -> bool {
        !self.full_rebuild && self.vertices_updated == 0 && self.cliffs.is_none()
    }
}

#[derive(Resource)]
pub struct TerrainSession {
    grid: TerrainGrid,
    features: FeatureTable,
    biome: &'static BiomeStyle,
    classifier: EdgeClassifier,
    cliffs: CliffGeometryBuilder,
    surface: HeightfieldMesh,
    dirty: DirtyRegion,
    needs_full_rebuild: bool,
    surface_revision: u64,
    cliff_revision: u64,
}

impl Default for TerrainSession {
    fn default() -> Self {
        Self::new(FeatureTable::default())
    }
}

impl TerrainSession {
    /// Empty session with the default biome. Call `load_grid` before editing.
    pub fn new(features: FeatureTable) -> Self {
        Self {
            grid: TerrainGrid::new(0, 0),
            features,
            biome: BiomeStyle::for_id(DEFAULT_BIOME),
            classifier: EdgeClassifier::new(),
            cliffs: CliffGeometryBuilder::new(),
            surface: HeightfieldMesh::new(),
            dirty: DirtyRegion::new(),
            needs_full_rebuild: false,
            surface_revision: 0,
            cliff_revision: 0,
        }
    }

    /// Replace the grid and rebuild everything. On error the session keeps
    /// its previous grid and geometry.
    pub fn load_grid(&mut self, grid: TerrainGrid) -> Result<(), TerrainError> {
        // Reject oversized grids before the classifier cache or any scan.
        buffer_sizes(grid.width(), grid.height())?;

        let mut classifier = EdgeClassifier::new();
        classifier.try_set_grid(&grid)?;
        let mut cliffs = CliffGeometryBuilder::new();
        let cliff_stats = cliffs.build_from_grid(&grid, &mut classifier, self.biome)?;

        let style = SurfaceStyle::new(self.biome, &self.features);
        self.surface.load_grid(&grid, &style)?;

        info!(
            "TerrainSession: loaded {}x{} grid, {} cliff cells, {} cliff quads",
            grid.width(),
            grid.height(),
            cliff_stats.cliff_cells,
            cliff_stats.quads()
        );

        self.grid = grid;
        self.classifier = classifier;
        self.cliffs = cliffs;
        self.dirty.clear();
        self.needs_full_rebuild = false;
        self.surface_revision += 1;
        self.cliff_revision += 1;
        Ok(())
    }

    /// Write a paint batch into the grid and record the touched area. Returns
    /// how many updates landed inside the grid.
    pub fn apply_cell_updates(&mut self, updates: &[CellUpdate]) -> usize {
        let touched = self.grid.apply_cell_updates(updates, &self.features);
        self.classifier.invalidate_cells(&touched);
        self.dirty.include_all(&touched);
        self.surface.mark_cells_dirty(&touched);
        touched.len()
    }

    /// Bring both meshes up to date with the grid.
    pub fn flush(&mut self) -> Result<FlushReport, TerrainError> {
        let mut report = FlushReport::default();
        let (w, h) = (self.grid.width(), self.grid.height());
        if w == 0 || h == 0 {
            self.dirty.clear();
            self.needs_full_rebuild = false;
            return Ok(report);
        }

        if self.needs_full_rebuild {
            let style = SurfaceStyle::new(self.biome, &self.features);
            report.vertices_updated = self.surface.force_full_rebuild(&self.grid, &style);
            self.bump_surface_revision(report.vertices_updated);
            // needs_full_rebuild stays set until the cliffs succeed.
            report.cliffs = Some(self.cliffs.build_from_grid(
                &self.grid,
                &mut self.classifier,
                self.biome,
            )?);
            report.full_rebuild = true;
            report.dirty_rect = Some(CellRect::new(0, 0, w - 1, h - 1));
            self.dirty.clear();
            self.needs_full_rebuild = false;
        } else if let Some(rect) = self.dirty.take_clamped(w - 1, h - 1) {
            let style = SurfaceStyle::new(self.biome, &self.features);
            report.vertices_updated = self.surface.update_dirty_region(&self.grid, &style);
            self.bump_surface_revision(report.vertices_updated);
            match self
                .cliffs
                .update_region(&self.grid, &mut self.classifier, self.biome, rect)
            {
                Ok(stats) => report.cliffs = Some(stats),
                Err(e) => {
                    // Retry the cliffs on the next flush.
                    self.dirty.include_rect(rect);
                    return Err(e);
                }
            }
            report.dirty_rect = Some(rect);
        }

        if report.cliffs.is_some() {
            self.cliff_revision += 1;
        }
        if !report.is_noop() {
            debug!(
                "TerrainSession: flushed {:?}, {} vertices, {} cliff quads",
                report.dirty_rect,
                report.vertices_updated,
                self.cliffs.quad_count()
            );
        }
        Ok(report)
    }

    fn bump_surface_revision(&mut self, vertices_updated: usize) {
        if vertices_updated > 0 {
            self.surface_revision += 1;
        }
    }

    /// Switch palettes. Both meshes are rebuilt on the next flush. Returns
    /// false when the resolved biome is already active.
    pub fn set_biome(&mut self, id: &str) -> bool {
        let style = BiomeStyle::for_id(id);
        if style.id == self.biome.id {
            return false;
        }
        info!("TerrainSession: biome {} -> {}", self.biome.id, style.id);
        self.biome = style;
        self.needs_full_rebuild = true;
        true
    }

    /// Replace the feature table. Surface colors are rebuilt on the next flush.
    pub fn set_feature_table(&mut self, features: FeatureTable) {
        info!("TerrainSession: feature table replaced ({} features)", features.len());
        self.features = features;
        self.needs_full_rebuild = true;
    }

    pub fn grid(&self) -> &TerrainGrid {
        &self.grid
    }

    pub fn features(&self) -> &FeatureTable {
        &self.features
    }

    pub fn biome(&self) -> &'static BiomeStyle {
        self.biome
    }

    pub fn surface(&self) -> &HeightfieldMesh {
        &self.surface
    }

    pub fn cliffs(&self) -> &CliffGeometryBuilder {
        &self.cliffs
    }

    /// Classification of (x, y), consistent with any unflushed edits.
    pub fn edge_info(&mut self, x: i32, y: i32) -> Option<CellEdgeInfo> {
        self.classifier.edge_info(&self.grid, x, y)
    }

    pub fn classifier_stats(&self) -> ClassifierStats {
        self.classifier.stats()
    }

    /// Surface height at a world position as of the last flush.
    pub fn height_at(&self, world_x: f32, world_z: f32) -> f32 {
        self.surface.height_at(world_x, world_z)
    }

    /// Whether edits or a style change are waiting for a flush.
    pub fn has_pending_changes(&self) -> bool {
        self.needs_full_rebuild || !self.dirty.is_empty()
    }

    /// Bumped whenever surface buffers change.
    pub fn surface_revision(&self) -> u64 {
        self.surface_revision
    }

    /// Bumped whenever cliff buffers are rebuilt.
    pub fn cliff_revision(&self) -> u64 {
        self.cliff_revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Cell, CellPatch};

    fn session_with(grid: TerrainGrid) -> TerrainSession {
        let mut session = TerrainSession::default();
        session.load_grid(grid).unwrap();
        session
    }

    #[test]
    fn test_load_bumps_revisions() {
        let session = session_with(TerrainGrid::new(8, 8));
        assert_eq!(session.surface_revision(), 1);
        assert_eq!(session.cliff_revision(), 1);
        assert_eq!(session.grid().width(), 8);
        assert!(!session.has_pending_changes());
    }

    #[test]
    fn test_flush_without_edits_is_noop() {
        let mut session = session_with(TerrainGrid::new(8, 8));
        let report = session.flush().unwrap();
        assert!(report.is_noop());
        assert_eq!(session.surface_revision(), 1);
    }

    #[test]
    fn test_edit_then_flush_updates_geometry() {
        let mut session = session_with(TerrainGrid::new(8, 8));
        let applied = session.apply_cell_updates(&[
            CellUpdate::new(3, 3, CellPatch::elevation(150).with_platform(true)),
            CellUpdate::new(-1, 2, CellPatch::elevation(10)),
        ]);
        assert_eq!(applied, 1);
        assert!(session.has_pending_changes());

        let report = session.flush().unwrap();
        assert_eq!(report.dirty_rect, Some(CellRect::new(2, 2, 4, 4)));
        assert_eq!(report.vertices_updated, 9);
        assert_eq!(report.cliffs.map(|c| c.quads()), Some(8));
        assert_eq!(session.cliffs().quad_count(), 8);
        assert_eq!(session.surface_revision(), 2);
        assert_eq!(session.cliff_revision(), 2);
        assert!((session.height_at(3.0, 3.0) - 15.0).abs() < 1e-5);
        assert!(!session.has_pending_changes());
    }

    #[test]
    fn test_edge_info_sees_unflushed_edit() {
        let mut session = session_with(TerrainGrid::new(5, 5));
        assert!(!session.edge_info(2, 2).unwrap().has_cliff());
        session.apply_cell_updates(&[CellUpdate::new(
            2,
            2,
            CellPatch::elevation(200).with_platform(true),
        )]);
        assert_eq!(session.edge_info(2, 2).unwrap().cliff_count(), 4);
    }

    #[test]
    fn test_biome_change_forces_full_rebuild() {
        let mut session = session_with(TerrainGrid::filled(4, 4, Cell::platform(60)));
        assert!(!session.set_biome("temperate"));
        assert!(session.set_biome("desert"));
        assert_eq!(session.biome().id, "desert");

        let report = session.flush().unwrap();
        assert!(report.full_rebuild);
        assert_eq!(report.vertices_updated, 25);
        let top = session.cliffs().buffers().color(3);
        assert_eq!(top, crate::biome::DESERT.cliff);
    }

    #[test]
    fn test_unknown_biome_falls_back_once() {
        let mut session = session_with(TerrainGrid::new(2, 2));
        assert!(session.set_biome("atlantis"));
        assert_eq!(session.biome().id, "neutral");
        assert!(!session.set_biome("also-unknown"));
    }

    #[test]
    fn test_failed_load_keeps_previous_state() {
        let mut session = session_with(TerrainGrid::new(4, 4));
        let before = session.surface().buffers().clone();
        let huge = TerrainGrid::new(crate::config::MAX_GRID_DIMENSION + 1, 1);
        assert!(session.load_grid(huge).is_err());
        assert_eq!(session.grid().width(), 4);
        assert_eq!(session.surface().buffers(), &before);
        assert_eq!(session.surface_revision(), 1);
    }

    #[test]
    fn test_oversized_load_rejected_before_classification() {
        let mut session = session_with(TerrainGrid::new(4, 4));
        let computed = session.classifier_stats().computed;
        let tall = TerrainGrid::filled(2, crate::config::MAX_GRID_DIMENSION + 1, Cell::platform(90));
        let err = session.load_grid(tall).unwrap_err();
        assert!(matches!(
            err,
            TerrainError::GridTooLarge { width: 2, height, .. }
                if height == crate::config::MAX_GRID_DIMENSION + 1
        ));
        assert_eq!(session.classifier_stats().computed, computed);
        assert_eq!(session.cliffs().quad_count(), 0);
        assert_eq!(session.cliff_revision(), 1);
    }

    #[test]
    fn test_failed_cliff_rebuild_still_publishes_surface() {
        let mut session = session_with(TerrainGrid::new(8, 8));
        session.apply_cell_updates(&[CellUpdate::new(
            3,
            3,
            CellPatch::elevation(150).with_platform(true),
        )]);
        session.cliffs.fail_next_build();

        assert!(session.flush().is_err());
        assert_eq!(session.surface_revision(), 2);
        assert_eq!(session.cliff_revision(), 1);
        assert!((session.height_at(3.0, 3.0) - 15.0).abs() < 1e-5);
        assert!(session.has_pending_changes());

        let report = session.flush().unwrap();
        assert_eq!(report.cliffs.map(|c| c.quads()), Some(8));
        assert_eq!(session.cliff_revision(), 2);
        assert!(!session.has_pending_changes());
    }

    #[test]
    fn test_failed_full_rebuild_is_retried() {
        let mut session = session_with(TerrainGrid::filled(4, 4, Cell::platform(60)));
        session.set_biome("desert");
        session.cliffs.fail_next_build();

        assert!(session.flush().is_err());
        assert_eq!(session.surface_revision(), 2);
        assert!(session.has_pending_changes());

        let report = session.flush().unwrap();
        assert!(report.full_rebuild);
        assert_eq!(session.cliffs().buffers().color(3), crate::biome::DESERT.cliff);
    }

    #[test]
    fn test_flush_on_empty_session() {
        let mut session = TerrainSession::default();
        session.apply_cell_updates(&[CellUpdate::new(0, 0, CellPatch::elevation(5))]);
        assert!(session.flush().unwrap().is_noop());
    }

    #[test]
    fn test_feature_table_swap_recolors_surface() {
        use crate::features::{FeatureDef, FEATURE_GROUND};
        let mut session = session_with(TerrainGrid::new(3, 3));
        let before = session.surface().buffers().color(0);

        let mut table = FeatureTable::empty();
        table.insert(FEATURE_GROUND, FeatureDef::new("ground", true, [0.5, 0.5, 0.5]));
        session.set_feature_table(table);
        session.flush().unwrap();

        let after = session.surface().buffers().color(0);
        assert!((after[0] - before[0] * 0.5).abs() < 1e-6);
    }
}
