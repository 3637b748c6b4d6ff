use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use super::grid::{Grid, GridPos, NodeIndex, NodeKind};
use crate::{Point, Vec2};

/// A node of the finished layout, real or virtual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub kind: NodeKind,
    pub column: usize,
    pub row: usize,
    /// Refined horizontal position, in grid units
    pub x: f32,
    /// Vertical position, always equal to `row`
    pub y: f32,
    /// Grid positions of the nodes on the row above linking to this one
    pub incoming: Vec<GridPos>,
    /// Grid positions of the nodes on the row below this one links to
    pub outgoing: Vec<GridPos>,
}

impl LayoutNode {
    pub fn label(&self) -> Cow<'_, str> {
        self.kind.label()
    }

    pub fn is_virtual(&self) -> bool {
        self.kind.is_virtual()
    }

    pub fn pos(&self) -> GridPos {
        GridPos::new(self.column, self.row)
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Layout nodes per layer, each layer ordered by column
pub type NodesByLayer = BTreeMap<usize, Vec<LayoutNode>>;

/// Polyline of an input edge, bending at its virtual nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgePath {
    pub source: String,
    pub target: String,
    pub points: Vec<Point>,
}

/// Result of a layered layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Every layer holding at least one node
    pub nodes: NodesByLayer,

    /// Number of edge crossings (quality metric)
    pub crossings: usize,
}

impl Layout {
    pub(crate) fn from_grid(grid: &Grid, crossings: usize) -> Self {
        let to_pos = |refs: &[NodeIndex]| -> Vec<GridPos> {
            refs.iter()
                .map(|&n| GridPos::new(grid.nodes[n].column, grid.nodes[n].row))
                .collect()
        };

        let nodes = grid
            .rows
            .iter()
            .enumerate()
            .filter(|(_, order)| !order.is_empty())
            .map(|(row, order)| {
                let layer = order
                    .iter()
                    .map(|&n| {
                        let node = &grid.nodes[n];
                        LayoutNode {
                            kind: node.kind.clone(),
                            column: node.column,
                            row: node.row,
                            x: node.x,
                            y: node.row as f32,
                            incoming: to_pos(&node.incoming),
                            outgoing: to_pos(&node.outgoing),
                        }
                    })
                    .collect();
                (row, layer)
            })
            .collect();

        Self { nodes, crossings }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up the node at a grid position
    pub fn node(&self, pos: GridPos) -> Option<&LayoutNode> {
        self.nodes.get(&pos.row)?.get(pos.column)
    }

    /// All nodes, layer by layer
    pub fn iter(&self) -> impl Iterator<Item = &LayoutNode> {
        self.nodes.values().flatten()
    }

    /// Nodes of the input graph, skipping virtual ones
    pub fn real_nodes(&self) -> impl Iterator<Item = &LayoutNode> {
        self.iter().filter(|n| !n.is_virtual())
    }

    /// Canvas position of every input node, given the size of a grid cell
    ///
    /// Keys are the input labels, which [`crate::GraphData::validate`] keeps unique.
    pub fn positions(&self, cell: Vec2) -> HashMap<String, Point> {
        self.real_nodes()
            .map(|n| (n.label().into_owned(), n.point().scale(cell)))
            .collect()
    }

    /// One polyline per input edge, in canvas coordinates
    ///
    /// Each path starts at the source, passes through the virtual nodes of
    /// the edge and ends at the target.
    pub fn edge_paths(&self, cell: Vec2) -> Vec<EdgePath> {
        let mut paths = Vec::new();

        for source in self.real_nodes() {
            for &first in &source.outgoing {
                let mut points = vec![source.point().scale(cell)];
                let mut current = self.node(first);

                while let Some(node) = current.filter(|n| n.is_virtual()) {
                    points.push(node.point().scale(cell));
                    current = node.outgoing.first().and_then(|&next| self.node(next));
                }

                let Some(target) = current else {
                    continue;
                };
                points.push(target.point().scale(cell));

                paths.push(EdgePath {
                    source: source.label().into_owned(),
                    target: target.label().into_owned(),
                    points,
                });
            }
        }

        paths
    }
}
