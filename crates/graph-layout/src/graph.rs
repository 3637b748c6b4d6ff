use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{IntoNeighborsDirected, IntoNodeIdentifiers};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use thiserror::Error;

use crate::layered::assign_layers;

/// Errors reported when a graph cannot be laid out
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidGraphError {
    /// There are more adjacency entries than nodes
    #[error("adjacency list has {adjacency} entries but the graph has {nodes} nodes")]
    AdjacencyLength { adjacency: usize, nodes: usize },

    /// A node sits on a layer outside of `0..total_layers`
    #[error("node {label:?} is on layer {layer} but the graph has {total_layers} layers")]
    LayerOutOfRange {
        label: String,
        layer: usize,
        total_layers: usize,
    },

    /// The declared layer count is not one past the deepest layer
    #[error("graph declares {total_layers} layers but its deepest node needs {expected}")]
    LayerCount { total_layers: usize, expected: usize },

    /// Two input nodes share a label
    #[error("label {label:?} is used by more than one node")]
    DuplicateLabel { label: String },

    /// An edge points outside of the node list
    #[error("edge {from} -> {to} points outside of the {nodes} nodes of the graph")]
    TargetOutOfRange { from: usize, to: usize, nodes: usize },

    /// The graph contains a cycle at the given node
    #[error("graph contains a cycle at node {label:?}")]
    GraphHasCycle { label: String },

    /// An edge does not point to a deeper layer
    #[error("edge {from:?} (layer {from_layer}) -> {to:?} (layer {to_layer}) does not point to a deeper layer")]
    NonDescendingEdge {
        from: String,
        from_layer: usize,
        to: String,
        to_layer: usize,
    },
}

/// A dialog node as handed over by the graph builder
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphNode {
    /// Stable identifier of the node
    pub label: String,

    /// Topological depth, `1 + max(layer of parents)` or 0 for roots
    pub layer: usize,
}

impl GraphNode {
    pub fn new(label: impl Into<String>, layer: usize) -> Self {
        Self {
            label: label.into(),
            layer,
        }
    }
}

/// A layered DAG ready to be laid out
///
/// `adjacency[i]` lists the indices of the targets of node `i`. The list may
/// be shorter than `nodes`, missing entries meaning "no outgoing edges".
///
/// Two structurally identical graphs hash to the same value, which makes
/// `GraphData` usable as a cache key for anything derived from its layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub adjacency: Vec<Vec<usize>>,
    pub total_layers: usize,
}

impl GraphData {
    /// Create a graph, deriving the layer count from the deepest node
    pub fn new(nodes: Vec<GraphNode>, adjacency: Vec<Vec<usize>>) -> Self {
        let total_layers = nodes
            .iter()
            .map(|n| n.layer.saturating_add(1))
            .max()
            .unwrap_or(0);
        Self {
            nodes,
            adjacency,
            total_layers,
        }
    }

    /// Build the layered input from any directed petgraph graph
    ///
    /// Nodes keep the order of `graph.node_identifiers()` and each one is
    /// assigned to the layer right after its deepest predecessor.
    ///
    /// # Errors
    /// Returns [`InvalidGraphError::GraphHasCycle`] if the graph is not a DAG
    pub fn from_graph<G, F>(graph: G, mut label: F) -> Result<Self, InvalidGraphError>
    where
        G: IntoNodeIdentifiers + IntoNeighborsDirected,
        G::NodeId: Copy + Ord + Hash,
        F: FnMut(G::NodeId) -> String,
    {
        let layered = assign_layers(graph).map_err(|node| InvalidGraphError::GraphHasCycle {
            label: label(node),
        })?;

        let index: HashMap<G::NodeId, usize> = layered
            .iter()
            .enumerate()
            .map(|(i, &(node, _))| (node, i))
            .collect();

        let adjacency = layered
            .iter()
            .map(|&(node, _)| {
                graph
                    .neighbors_directed(node, Direction::Outgoing)
                    .filter_map(|succ| index.get(&succ).copied())
                    .collect()
            })
            .collect();

        let nodes = layered
            .into_iter()
            .map(|(node, layer)| GraphNode {
                label: label(node),
                layer,
            })
            .collect();

        Ok(Self::new(nodes, adjacency))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All `(source, target)` edges, in adjacency order
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(source, targets)| targets.iter().map(move |&target| (source, target)))
    }

    /// Check the structural preconditions of the layered layout
    ///
    /// # Errors
    /// Returns the first defect found: adjacency longer than the node list,
    /// layers out of range, a layer count other than one past the deepest
    /// layer, duplicate labels, dangling edges, cycles, then edges that do
    /// not point to a strictly deeper layer.
    pub fn validate(&self) -> Result<(), InvalidGraphError> {
        if self.adjacency.len() > self.nodes.len() {
            return Err(InvalidGraphError::AdjacencyLength {
                adjacency: self.adjacency.len(),
                nodes: self.nodes.len(),
            });
        }

        if let Some(node) = self.nodes.iter().find(|n| n.layer >= self.total_layers) {
            return Err(InvalidGraphError::LayerOutOfRange {
                label: node.label.clone(),
                layer: node.layer,
                total_layers: self.total_layers,
            });
        }

        // Every layer is below `total_layers` here, so this cannot overflow
        let expected = self.nodes.iter().map(|n| n.layer + 1).max().unwrap_or(0);
        if self.total_layers != expected {
            return Err(InvalidGraphError::LayerCount {
                total_layers: self.total_layers,
                expected,
            });
        }

        let mut labels = HashSet::with_capacity(self.nodes.len());
        if let Some(node) = self.nodes.iter().find(|n| !labels.insert(n.label.as_str())) {
            return Err(InvalidGraphError::DuplicateLabel {
                label: node.label.clone(),
            });
        }

        if let Some((source, target)) = self.edges().find(|&(_, t)| t >= self.nodes.len()) {
            return Err(InvalidGraphError::TargetOutOfRange {
                from: source,
                to: target,
                nodes: self.nodes.len(),
            });
        }

        let mut dag = DiGraphMap::<usize, ()>::new();
        for i in 0..self.nodes.len() {
            dag.add_node(i);
        }
        for (source, target) in self.edges() {
            dag.add_edge(source, target, ());
        }
        toposort(&dag, None).map_err(|cycle| InvalidGraphError::GraphHasCycle {
            label: self.nodes[cycle.node_id()].label.clone(),
        })?;

        for (source, target) in self.edges() {
            let (from, to) = (&self.nodes[source], &self.nodes[target]);
            if to.layer <= from.layer {
                return Err(InvalidGraphError::NonDescendingEdge {
                    from: from.label.clone(),
                    from_layer: from.layer,
                    to: to.label.clone(),
                    to_layer: to.layer,
                });
            }
        }

        Ok(())
    }
}
