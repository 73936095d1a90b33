//! Pure classification functions. Everything here reads the grid and nothing
//! else, so a cached result is always equal to a fresh one for the same grid.

use crate::config::{elevation_to_y, CLIFF_THRESHOLD};
use crate::grid::{Corner, Direction, EdgeStyle, TerrainGrid};

use super::{CellEdgeInfo, CornerKind, EdgeInfo, EdgeKind};

fn cliff(delta: i16) -> EdgeInfo {
    EdgeInfo {
        kind: EdgeKind::Cliff,
        elevation_delta: delta,
        cliff_height: elevation_to_y(delta.unsigned_abs() as f32),
    }
}

fn flat(kind: EdgeKind, delta: i16) -> EdgeInfo {
    EdgeInfo {
        kind,
        elevation_delta: delta,
        cliff_height: 0.0,
    }
}

/// Classify the edge of (x, y) facing `dir`. Caller guarantees (x, y) is in bounds.
pub fn classify_edge(grid: &TerrainGrid, x: usize, y: usize, dir: Direction) -> EdgeInfo {
    let cell = grid.get(x, y);

    let Some(neighbor) = grid.neighbor(x, y, dir) else {
        // Map boundary: a platform drops to nothing.
        let delta = cell.elevation as i16;
        return if cell.platform {
            cliff(delta)
        } else {
            flat(EdgeKind::None, delta)
        };
    };

    let delta = cell.elevation as i16 - neighbor.elevation as i16;

    match cell.edge_override(dir) {
        Some(EdgeStyle::Natural) => return flat(EdgeKind::Natural, delta),
        Some(EdgeStyle::Ramp) => return flat(EdgeKind::Ramp, delta),
        Some(EdgeStyle::Cliff) => return cliff(delta),
        None => {}
    }

    if neighbor.ramp {
        return flat(EdgeKind::Ramp, delta);
    }
    if !cell.platform {
        return flat(EdgeKind::None, delta);
    }
    // Platform flag of the neighbor does not matter: under the threshold the
    // two levels join, at or over it they form a wall.
    if delta.abs() >= CLIFF_THRESHOLD {
        cliff(delta)
    } else {
        flat(EdgeKind::None, delta)
    }
}

/// Classify one corner from the two adjacent (already classified) edges and
/// the diagonal neighbor.
pub fn classify_corner(
    grid: &TerrainGrid,
    x: usize,
    y: usize,
    corner: Corner,
    edges: &[EdgeInfo; 4],
) -> CornerKind {
    let (vertical, horizontal) = corner.edges();
    let v_cliff = edges[vertical.index()].is_cliff();
    let h_cliff = edges[horizontal.index()].is_cliff();

    if v_cliff && h_cliff {
        return CornerKind::Convex;
    }
    if v_cliff || h_cliff {
        return CornerKind::None;
    }

    let cell = grid.get(x, y);
    if !cell.platform {
        return CornerKind::None;
    }
    let (dx, dy) = corner.offset();
    match grid.get_checked(x as i32 + dx, y as i32 + dy) {
        Some(diagonal)
            if cell.elevation as i16 - diagonal.elevation as i16 >= CLIFF_THRESHOLD =>
        {
            CornerKind::Concave
        }
        _ => CornerKind::None,
    }
}

/// Full classification of one in-bounds cell.
pub fn classify_cell(grid: &TerrainGrid, x: usize, y: usize) -> CellEdgeInfo {
    let mut edges = [EdgeInfo::NONE; 4];
    for dir in Direction::ALL {
        edges[dir.index()] = classify_edge(grid, x, y, dir);
    }
    let mut corners = [CornerKind::None; 4];
    for corner in Corner::ALL {
        corners[corner.index()] = classify_corner(grid, x, y, corner, &edges);
    }
    CellEdgeInfo {
        x,
        y,
        edges,
        corners,
    }
}
