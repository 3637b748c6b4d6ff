//! Layered layout of branching dialog phase graphs
//!
//! Dialog scripts form DAGs whose nodes are grouped by topological layer.
//! This crate assigns every node a `(column, row)` grid position, routes
//! edges spanning several layers through virtual bend nodes, reduces edge
//! crossings and refines horizontal coordinates, so a renderer can place
//! node boxes and draw polyline edges without recomputing topology.
//!
//! # Layout Engines
//!
//! - [`LayeredLayout`]: Sugiyama-style layered layout for DAGs
//!
//! # Example
//!
//! ```
//! use dialog_graph_layout::{GraphData, GraphNode, LayeredLayout, LayoutEngine, Vec2};
//!
//! // "intro" leads to "question" and, skipping a layer, to "outro"
//! let graph = GraphData::new(
//!     vec![
//!         GraphNode::new("intro", 0),
//!         GraphNode::new("question", 1),
//!         GraphNode::new("outro", 2),
//!     ],
//!     vec![vec![1, 2], vec![2]],
//! );
//!
//! let engine = LayeredLayout::default();
//! let layout = engine.layout(&graph).unwrap();
//!
//! // Real node positions, scaled to the canvas
//! let positions = layout.positions(Vec2::new(120.0, 80.0));
//! assert_eq!(positions.len(), 3);
//!
//! // The long edge bends at the virtual node of layer 1
//! let paths = layout.edge_paths(Vec2::splat(1.0));
//! assert!(paths.iter().any(|p| p.target == "outro" && p.points.len() == 3));
//! ```
//!
//! Graphs built with petgraph can be converted with [`GraphData::from_graph`],
//! which also assigns the layers.

mod engine;
mod geometry;
mod graph;

pub mod layered;

// Re-export core types and traits
pub use engine::LayoutEngine;
pub use geometry::{Point, Vec2};
pub use graph::{GraphData, GraphNode, InvalidGraphError};

// Re-export layered layout types
pub use layered::{
    EdgePath, GridPos, LayeredLayout, Layout, LayoutNode, NodeKind, NodesByLayer, VirtualId,
    VirtualIds,
};
