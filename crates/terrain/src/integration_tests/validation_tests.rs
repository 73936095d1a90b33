//! Connectivity validation driven through `ValidateConnectivity`.

use crate::connectivity::{ConnectivityReport, GridValidator};
use crate::grid::{CellPatch, CellUpdate, Direction, EdgeStyle, TerrainGrid};
use crate::plugin::ActiveValidator;
use crate::test_harness::TestTerrain;

#[test]
fn test_no_report_without_request() {
    let mut terrain = TestTerrain::new(8, 8);
    terrain.tick(3);
    assert!(terrain.connectivity_reports().is_empty());
}

#[test]
fn test_duplicate_requests_produce_one_report() {
    let mut terrain = TestTerrain::new(8, 8);
    terrain.request_validation();
    terrain.request_validation();
    terrain.tick(1);
    let reports = terrain.connectivity_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].regions, 1);
    assert_eq!(reports[0].walkable_cells, 64);
}

#[test]
fn test_raised_platform_splits_regions_until_ramped() {
    let mut terrain = TestTerrain::new(10, 10).with_platform_rect(3, 3, 5, 5, 120);
    terrain.request_validation();
    terrain.tick(1);
    let report = &terrain.connectivity_reports()[0];
    assert_eq!(report.regions, 2);
    assert_eq!(report.largest_region, 91);

    terrain.paint(vec![CellUpdate::new(
        4,
        5,
        CellPatch::default().with_edge_override(Direction::South, Some(EdgeStyle::Ramp)),
    )]);
    terrain.request_validation();
    terrain.tick(1);
    let report = &terrain.connectivity_reports()[0];
    assert!(report.is_connected());
    assert_eq!(report.walkable_cells, 100);
}

#[test]
fn test_validation_sees_edits_from_same_frame() {
    let mut terrain = TestTerrain::new(6, 3);
    let wall: Vec<CellUpdate> = (0..3)
        .map(|y| CellUpdate::new(2, y, CellPatch::default().with_walkable(false)))
        .collect();
    terrain.paint(wall);
    terrain.request_validation();
    terrain.tick(1);
    assert_eq!(terrain.connectivity_reports()[0].regions, 2);
}

struct CountWalkable;

impl GridValidator for CountWalkable {
    fn validate(&self, grid: &TerrainGrid) -> ConnectivityReport {
        let walkable = grid.cells().iter().filter(|c| c.walkable).count();
        ConnectivityReport {
            walkable_cells: walkable,
            ..Default::default()
        }
    }
}

#[test]
fn test_custom_validator_can_be_swapped_in() {
    let mut terrain = TestTerrain::new(5, 4);
    terrain
        .world_mut()
        .insert_resource(ActiveValidator(Box::new(CountWalkable)));
    terrain.request_validation();
    terrain.tick(1);
    let report = &terrain.connectivity_reports()[0];
    assert_eq!(report.walkable_cells, 20);
    assert_eq!(report.regions, 0);
}
