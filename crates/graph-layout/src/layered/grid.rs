use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::GraphData;

/// Position of a node on the layout grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub column: usize,
    pub row: usize,
}

impl GridPos {
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }
}

/// Identifier of a node synthesized to route an edge across a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VirtualId(pub u64);

impl fmt::Display for VirtualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "virtual-{}", self.0)
    }
}

/// Monotonic generator of [`VirtualId`]s
///
/// Ids are unique for as long as the same generator is reused. Share one
/// across renders when virtual ids must not collide within a session.
#[derive(Debug, Default)]
pub struct VirtualIds {
    next: u64,
}

impl VirtualIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_id(&mut self) -> VirtualId {
        let id = VirtualId(self.next);
        self.next += 1;
        id
    }
}

/// What a grid node stands for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A node of the input graph
    Real { label: String },
    /// A bend point of an edge spanning more than one layer
    Virtual { id: VirtualId },
}

impl NodeKind {
    /// The input label, or a generated placeholder for virtual nodes
    pub fn label(&self) -> Cow<'_, str> {
        match self {
            NodeKind::Real { label } => Cow::Borrowed(label),
            NodeKind::Virtual { id } => Cow::Owned(id.to_string()),
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, NodeKind::Virtual { .. })
    }
}

pub(crate) type NodeIndex = usize;

#[derive(Debug, Clone)]
pub(crate) struct GridNode {
    pub kind: NodeKind,
    pub column: usize,
    pub row: usize,
    /// Refined horizontal position, equal to `column` until alignment
    pub x: f32,
    pub incoming: Vec<NodeIndex>,
    pub outgoing: Vec<NodeIndex>,
    pub upper_weight: Option<f32>,
    pub lower_weight: Option<f32>,
}

/// Arena of grid nodes with the column order of every row
///
/// `rows[r][c]` is the node at column `c` of row `r`, and that node's
/// `column` is always `c`.
#[derive(Debug, Clone, Default)]
pub(crate) struct Grid {
    pub nodes: Vec<GridNode>,
    pub rows: Vec<Vec<NodeIndex>>,
}

impl Grid {
    /// Place every input node, then split its edges into unit-span hops
    ///
    /// Input node `i` is stored at arena index `i`; virtual nodes follow.
    pub fn build(graph: &GraphData, ids: &mut VirtualIds) -> Self {
        let mut grid = Grid {
            nodes: Vec::with_capacity(graph.nodes.len()),
            rows: vec![Vec::new(); graph.total_layers],
        };

        for node in &graph.nodes {
            grid.push(
                NodeKind::Real {
                    label: node.label.clone(),
                },
                node.layer,
            );
        }

        for (source, target) in graph.edges() {
            grid.add_edge(source, target, ids);
        }

        grid.update_weights();
        grid
    }

    /// Append a node at the next free column of `row`
    fn push(&mut self, kind: NodeKind, row: usize) -> NodeIndex {
        let index = self.nodes.len();
        let column = self.rows[row].len();
        self.rows[row].push(index);
        self.nodes.push(GridNode {
            kind,
            column,
            row,
            x: column as f32,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            upper_weight: None,
            lower_weight: None,
        });
        index
    }

    fn link(&mut self, from: NodeIndex, to: NodeIndex) {
        self.nodes[from].outgoing.push(to);
        self.nodes[to].incoming.push(from);
    }

    /// Realize an edge, adding one virtual node per skipped layer
    fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, ids: &mut VirtualIds) {
        let (from_row, to_row) = (self.nodes[source].row, self.nodes[target].row);

        let mut prev = source;
        for row in from_row + 1..to_row {
            let node = self.push(NodeKind::Virtual { id: ids.next_id() }, row);
            self.link(prev, node);
            prev = node;
        }
        self.link(prev, target);
    }

    pub fn real_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.kind.is_virtual()).count()
    }

    /// Neighbors on the row above (`Incoming`) or below (`Outgoing`)
    pub fn neighbors(&self, node: NodeIndex, dir: Direction) -> &[NodeIndex] {
        match dir {
            Direction::Incoming => &self.nodes[node].incoming,
            Direction::Outgoing => &self.nodes[node].outgoing,
        }
    }

    pub fn weight(&self, node: NodeIndex, dir: Direction) -> Option<f32> {
        match dir {
            Direction::Incoming => self.nodes[node].upper_weight,
            Direction::Outgoing => self.nodes[node].lower_weight,
        }
    }

    pub fn update_weight(&mut self, node: NodeIndex) {
        let upper = median(self.nodes[node].incoming.iter().map(|&n| self.nodes[n].x));
        let lower = median(self.nodes[node].outgoing.iter().map(|&n| self.nodes[n].x));
        let node = &mut self.nodes[node];
        node.upper_weight = upper;
        node.lower_weight = lower;
    }

    pub fn update_weights(&mut self) {
        for node in 0..self.nodes.len() {
            self.update_weight(node);
        }
    }

    /// Replace the order of `row` and refresh the weights depending on it
    pub fn reorder_row(&mut self, row: usize, order: Vec<NodeIndex>) {
        for (column, &node) in order.iter().enumerate() {
            let node = &mut self.nodes[node];
            node.column = column;
            node.x = column as f32;
        }

        let mut affected: Vec<NodeIndex> = order
            .iter()
            .flat_map(|&n| self.nodes[n].incoming.iter().chain(&self.nodes[n].outgoing))
            .copied()
            .collect();
        affected.sort_unstable();
        affected.dedup();

        self.rows[row] = order;
        for node in affected {
            self.update_weight(node);
        }
    }
}

/// Median of the values, averaging the two middle ones for even counts
pub(crate) fn median(values: impl Iterator<Item = f32>) -> Option<f32> {
    let mut values: Vec<f32> = values.collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f32::total_cmp);

    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}
