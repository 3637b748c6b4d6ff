use petgraph::Direction;
use tracing::trace;

use super::grid::{Grid, NodeIndex};

/// Horizontal positions per unit available to real nodes
const REAL_RESOLUTION: f32 = 1.0;

/// Horizontal positions per unit available to virtual nodes
const VIRTUAL_RESOLUTION: f32 = 10.0;

/// Slack absorbing f32 noise when snapping down
const SNAP_EPSILON: f32 = 1e-3;

/// Refine horizontal positions by pulling nodes toward their median weights
///
/// Every iteration aligns rows top-down against their upper weights, then
/// bottom-up against their lower weights, refreshing all weights after each
/// pass. Nodes only ever move right.
pub(crate) fn assign_coordinates(grid: &mut Grid, iterations: usize) {
    let rows = grid.rows.len();

    for iteration in 0..iterations {
        for row in 0..rows {
            align_row(grid, row, Direction::Incoming);
        }
        grid.update_weights();

        for row in (0..rows).rev() {
            align_row(grid, row, Direction::Outgoing);
        }
        grid.update_weights();

        trace!(iteration, "alignment pass done");
    }
}

/// Move the nodes of `row` right toward their weight in direction `dir`
///
/// Nodes are visited right to left. The rightmost node moves straight to its
/// target; any other node stops at the last position strictly left of its
/// right neighbor.
fn align_row(grid: &mut Grid, row: usize, dir: Direction) {
    let order = &grid.rows[row];

    for pos in (0..order.len()).rev() {
        let node = order[pos];
        let Some(target) = grid.weight(node, dir) else {
            continue;
        };

        let resolution = resolution_of(grid, node);
        let limit = order
            .get(pos + 1)
            .map(|&right| snap_below(grid.nodes[right].x, resolution));

        let x = match limit {
            Some(limit) => snap(target, resolution).min(limit),
            None => snap(target, resolution),
        };

        if x > grid.nodes[node].x {
            grid.nodes[node].x = x;
        }
    }
}

fn resolution_of(grid: &Grid, node: NodeIndex) -> f32 {
    if grid.nodes[node].kind.is_virtual() {
        VIRTUAL_RESOLUTION
    } else {
        REAL_RESOLUTION
    }
}

/// Round `value` down to the closest position at `resolution`
fn snap(value: f32, resolution: f32) -> f32 {
    (value * resolution + SNAP_EPSILON).floor() / resolution
}

/// Closest position at `resolution` strictly left of `value`
fn snap_below(value: f32, resolution: f32) -> f32 {
    ((value * resolution - SNAP_EPSILON).ceil() - 1.0) / resolution
}
