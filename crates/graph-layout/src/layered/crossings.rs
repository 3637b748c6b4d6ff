use petgraph::Direction;
use tracing::trace;

use super::grid::{Grid, NodeIndex};

/// Reduce edge crossings by reordering rows along their median weights
///
/// Each sweep walks down the rows ordering by upper weight, then back up
/// ordering by lower weight. A reorder is only kept when it strictly lowers
/// the crossings against the neighboring row.
pub(crate) fn minimize_crossings(grid: &mut Grid, sweeps: usize) {
    let rows = grid.rows.len();

    for sweep in 0..sweeps {
        let mut reordered = 0;

        for row in 1..rows {
            if order_row(grid, row, Direction::Incoming) {
                reordered += 1;
            }
        }
        for row in (0..rows.saturating_sub(1)).rev() {
            if order_row(grid, row, Direction::Outgoing) {
                reordered += 1;
            }
        }

        trace!(sweep, reordered, "crossing sweep done");

        // Nothing moved, every further sweep would see the same grid
        if reordered == 0 {
            break;
        }
    }
}

/// Try to reorder one row against the row above or below it
fn order_row(grid: &mut Grid, row: usize, dir: Direction) -> bool {
    let current = &grid.rows[row];
    let mut candidate = current.clone();
    sort_by_weight(&mut candidate, |node| grid.weight(node, dir));

    if &candidate == current {
        return false;
    }

    let before = row_crossings(grid, current, dir);
    let after = row_crossings(grid, &candidate, dir);
    if after >= before {
        return false;
    }

    trace!(row, ?dir, before, after, "row reordered");
    grid.reorder_row(row, candidate);
    true
}

/// Stable insertion sort by ascending weight
///
/// A node without weight compares neither less nor greater than any other,
/// so it never swaps and holds its place.
fn sort_by_weight(order: &mut [NodeIndex], weight: impl Fn(NodeIndex) -> Option<f32>) {
    for i in 1..order.len() {
        let mut j = i;
        while j > 0 && is_lighter(weight(order[j]), weight(order[j - 1])) {
            order.swap(j - 1, j);
            j -= 1;
        }
    }
}

fn is_lighter(a: Option<f32>, b: Option<f32>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a < b)
}

/// Crossings between `order` and the adjacent row in direction `dir`
///
/// For each pair of nodes with `left` before `right` in `order`, every pair
/// of their neighbor columns `(a, b)` with `a > b` is one crossing.
pub(crate) fn row_crossings(grid: &Grid, order: &[NodeIndex], dir: Direction) -> usize {
    let columns: Vec<Vec<usize>> = order
        .iter()
        .map(|&node| {
            grid.neighbors(node, dir)
                .iter()
                .map(|&n| grid.nodes[n].column)
                .collect()
        })
        .collect();

    let mut crossings = 0;
    for (i, left) in columns.iter().enumerate() {
        for right in &columns[i + 1..] {
            for &a in left {
                crossings += right.iter().filter(|&&b| a > b).count();
            }
        }
    }
    crossings
}

/// Total crossings between every pair of adjacent rows
pub(crate) fn count_crossings(grid: &Grid) -> usize {
    grid.rows
        .iter()
        .skip(1)
        .map(|order| row_crossings(grid, order, Direction::Incoming))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layered::grid::VirtualIds;
    use crate::{GraphData, GraphNode};
    use test_log::test;

    fn grid(nodes: &[(&str, usize)], adjacency: Vec<Vec<usize>>) -> Grid {
        let nodes = nodes.iter().map(|&(l, r)| GraphNode::new(l, r)).collect();
        Grid::build(&GraphData::new(nodes, adjacency), &mut VirtualIds::new())
    }

    #[test]
    fn counts_single_crossing() {
        // a -> d, b -> c
        let g = grid(
            &[("a", 0), ("b", 0), ("c", 1), ("d", 1)],
            vec![vec![3], vec![2]],
        );
        assert_eq!(row_crossings(&g, &g.rows[1], Direction::Incoming), 1);
        assert_eq!(row_crossings(&g, &g.rows[0], Direction::Outgoing), 1);
        assert_eq!(count_crossings(&g), 1);
    }

    #[test]
    fn fan_out_does_not_cross() {
        let g = grid(
            &[("a", 0), ("b", 1), ("c", 1), ("d", 1)],
            vec![vec![1, 2, 3]],
        );
        assert_eq!(count_crossings(&g), 0);
    }

    #[test]
    fn sort_keeps_unweighted_in_place() {
        let weights = [Some(2.0), None, Some(1.0), Some(0.0)];
        let mut order = vec![0, 1, 2, 3];
        sort_by_weight(&mut order, |n| weights[n]);
        // 2 and 3 cannot pass the unweighted node 1
        assert_eq!(order, vec![0, 1, 3, 2]);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let weights = [Some(1.0), Some(0.0), Some(1.0), Some(0.0)];
        let mut order = vec![0, 1, 2, 3];
        sort_by_weight(&mut order, |n| weights[n]);
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn removes_simple_crossing() {
        let mut g = grid(
            &[("a", 0), ("b", 0), ("c", 1), ("d", 1)],
            vec![vec![3], vec![2]],
        );

        minimize_crossings(&mut g, 20);

        assert_eq!(count_crossings(&g), 0);
        // The top row has no upper neighbors and keeps its order
        assert_eq!(g.rows[0], vec![0, 1]);
        assert_eq!(g.rows[1], vec![3, 2]);
        assert_eq!(g.nodes[3].column, 0);
        assert_eq!(g.nodes[2].column, 1);
    }

    #[test]
    fn rejects_reorder_without_gain() {
        // Both rows are fully connected, every order has the same crossings
        let mut g = grid(
            &[("a", 0), ("b", 0), ("c", 1), ("d", 1)],
            vec![vec![2, 3], vec![2, 3]],
        );
        let before = count_crossings(&g);

        minimize_crossings(&mut g, 20);

        assert_eq!(count_crossings(&g), before);
        assert_eq!(g.rows, vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn zero_sweeps_leave_grid_untouched() {
        let mut g = grid(
            &[("a", 0), ("b", 0), ("c", 1), ("d", 1)],
            vec![vec![3], vec![2]],
        );
        minimize_crossings(&mut g, 0);
        assert_eq!(count_crossings(&g), 1);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;
        use test_log::test;

        proptest! {
            #[test]
            fn accepted_reorders_never_add_crossings(
                layers in prop::collection::vec(0usize..4, 1..12),
                pairs in prop::collection::vec((any::<usize>(), any::<usize>()), 0..24),
            ) {
                let nodes: Vec<(String, usize)> = layers
                    .iter()
                    .enumerate()
                    .map(|(i, &layer)| (format!("n{i}"), layer))
                    .collect();
                let mut adjacency = vec![Vec::new(); nodes.len()];
                for (a, b) in pairs {
                    let (from, to) = (a % nodes.len(), b % nodes.len());
                    if nodes[to].1 > nodes[from].1 {
                        adjacency[from].push(to);
                    }
                }
                let nodes: Vec<(&str, usize)> =
                    nodes.iter().map(|(l, layer)| (l.as_str(), *layer)).collect();
                let mut g = grid(&nodes, adjacency);

                for _ in 0..3 {
                    for row in 1..g.rows.len() {
                        let before = row_crossings(&g, &g.rows[row], Direction::Incoming);
                        order_row(&mut g, row, Direction::Incoming);
                        let after = row_crossings(&g, &g.rows[row], Direction::Incoming);
                        prop_assert!(after <= before);
                    }
                    for row in (0..g.rows.len().saturating_sub(1)).rev() {
                        let before = row_crossings(&g, &g.rows[row], Direction::Outgoing);
                        order_row(&mut g, row, Direction::Outgoing);
                        let after = row_crossings(&g, &g.rows[row], Direction::Outgoing);
                        prop_assert!(after <= before);
                    }
                }
            }
        }
    }
}
