//! Quad emission for cliff faces and convex-corner seam fillers.

use crate::config::{CELL_SIZE, CLIFF_BOTTOM_SHADE};
use crate::grid::{Corner, Direction};
use crate::mesh_buffers::{scale_color, GeometryBuffers};

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Outward normal of the face on the `dir` side of a cell.
pub fn edge_normal(dir: Direction) -> [f32; 3] {
    match dir {
        Direction::North => [0.0, 0.0, -1.0],
        Direction::South => [0.0, 0.0, 1.0],
        Direction::East => [1.0, 0.0, 0.0],
        Direction::West => [-1.0, 0.0, 0.0],
    }
}

/// Diagonal outward normal at a cell corner.
pub fn corner_normal(corner: Corner) -> [f32; 3] {
    let (v, h) = corner.edges();
    let nx = edge_normal(h)[0];
    let nz = edge_normal(v)[2];
    [nx * std::f32::consts::FRAC_1_SQRT_2, 0.0, nz * std::f32::consts::FRAC_1_SQRT_2]
}

/// Horizontal endpoints (x, z) of the `dir` edge of cell (x, y), ordered so
/// that bottom(p0) -> bottom(p1) -> top(p1) winds counter-clockwise seen from
/// outside the cell.
fn edge_endpoints(x: usize, y: usize, dir: Direction) -> ([f32; 2], [f32; 2]) {
    let x0 = x as f32 * CELL_SIZE;
    let x1 = x0 + CELL_SIZE;
    let z0 = y as f32 * CELL_SIZE;
    let z1 = z0 + CELL_SIZE;
    match dir {
        Direction::North => ([x1, z0], [x0, z0]),
        Direction::South => ([x0, z1], [x1, z1]),
        Direction::East => ([x1, z1], [x1, z0]),
        Direction::West => ([x0, z0], [x0, z1]),
    }
}

fn corner_point(x: usize, y: usize, corner: Corner) -> [f32; 2] {
    let x0 = x as f32 * CELL_SIZE;
    let z0 = y as f32 * CELL_SIZE;
    match corner {
        Corner::NorthWest => [x0, z0],
        Corner::NorthEast => [x0 + CELL_SIZE, z0],
        Corner::SouthWest => [x0, z0 + CELL_SIZE],
        Corner::SouthEast => [x0 + CELL_SIZE, z0 + CELL_SIZE],
    }
}

fn push_quad(
    buf: &mut GeometryBuffers,
    p0: [f32; 2],
    p1: [f32; 2],
    top: f32,
    bottom: f32,
    color: [f32; 3],
    normal: [f32; 3],
) {
    let bottom_color = scale_color(color, CLIFF_BOTTOM_SHADE);
    let base = buf.push_vertex([p0[0], bottom, p0[1]], bottom_color, normal);
    buf.push_vertex([p1[0], bottom, p1[1]], bottom_color, normal);
    buf.push_vertex([p1[0], top, p1[1]], color, normal);
    buf.push_vertex([p0[0], top, p0[1]], color, normal);
    buf.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
}

/// One wall on the `dir` side of cell (x, y), from `top` down to `bottom`.
pub fn push_edge_quad(
    buf: &mut GeometryBuffers,
    x: usize,
    y: usize,
    dir: Direction,
    top: f32,
    bottom: f32,
    color: [f32; 3],
) {
    let (p0, p1) = edge_endpoints(x, y, dir);
    push_quad(buf, p0, p1, top, bottom, color, edge_normal(dir));
}

/// Seam filler at a convex corner. Both columns sit on the corner point, so
/// the quad has zero width.
pub fn push_corner_quad(
    buf: &mut GeometryBuffers,
    x: usize,
    y: usize,
    corner: Corner,
    top: f32,
    bottom: f32,
    color: [f32; 3],
) {
    let p = corner_point(x, y, corner);
    push_quad(buf, p, p, top, bottom, color, corner_normal(corner));
}
