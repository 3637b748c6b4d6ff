mod crossings;
mod grid;
mod layers;
mod output;
mod positions;

use tracing::debug;

use crate::{GraphData, InvalidGraphError, LayoutEngine};

pub use grid::{GridPos, NodeKind, VirtualId, VirtualIds};
pub use output::{EdgePath, Layout, LayoutNode, NodesByLayer};

pub(crate) use layers::assign_layers;

use crossings::{count_crossings, minimize_crossings};
use grid::Grid;
use positions::assign_coordinates;

/// Configuration for the layered (Sugiyama-style) DAG layout
#[derive(Debug, Clone)]
pub struct LayeredLayout {
    /// Number of down-and-up crossing reduction sweeps
    pub crossing_sweeps: usize,

    /// Number of down-and-up coordinate alignment iterations
    pub alignment_iterations: usize,
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self {
            crossing_sweeps: 20,
            alignment_iterations: 4,
        }
    }
}

impl LayeredLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay out a layered DAG
    ///
    /// Virtual node ids start from zero on every call, so identical input
    /// always gives identical output.
    ///
    /// # Errors
    /// Returns an error if the graph fails [`GraphData::validate`]
    pub fn render(&self, graph: &GraphData) -> Result<Layout, InvalidGraphError> {
        self.render_with_ids(graph, &mut VirtualIds::new())
    }

    /// Lay out a layered DAG, drawing virtual node ids from `ids`
    ///
    /// Runs four steps in order: initial placement of the input
    /// nodes, splitting of long edges into virtual node chains, crossing
    /// reduction, and horizontal coordinate refinement.
    ///
    /// # Errors
    /// Returns an error if the graph fails [`GraphData::validate`]
    pub fn render_with_ids(
        &self,
        graph: &GraphData,
        ids: &mut VirtualIds,
    ) -> Result<Layout, InvalidGraphError> {
        graph.validate()?;

        let mut grid = Grid::build(graph, ids);
        debug!(
            nodes = grid.real_count(),
            virtual_nodes = grid.nodes.len() - grid.real_count(),
            layers = grid.rows.len(),
            "grid built"
        );

        minimize_crossings(&mut grid, self.crossing_sweeps);
        let crossings = count_crossings(&grid);
        debug!(crossings, "crossings minimized");

        assign_coordinates(&mut grid, self.alignment_iterations);

        Ok(Layout::from_grid(&grid, crossings))
    }
}

impl<'a> LayoutEngine<&'a GraphData> for LayeredLayout {
    type Output = Layout;
    type Error = InvalidGraphError;

    fn layout(&self, graph: &'a GraphData) -> Result<Layout, InvalidGraphError> {
        self.render(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphNode;
    use test_log::test;

    #[test]
    fn empty_graph_gives_empty_layout() {
        let layout = LayeredLayout::new().render(&GraphData::default()).unwrap();
        assert!(layout.is_empty());
        assert_eq!(layout.crossings, 0);
    }

    #[test]
    fn single_node_stays_at_origin() {
        let graph = GraphData::new(vec![GraphNode::new("A", 0)], vec![]);
        let layout = LayeredLayout::new().render(&graph).unwrap();

        assert_eq!(layout.nodes.len(), 1);
        let node = &layout.nodes[&0][0];
        assert_eq!(node.label(), "A");
        assert_eq!((node.x, node.y), (0.0, 0.0));
        assert!(!node.is_virtual());
    }

    #[test]
    fn invalid_graph_is_rejected_before_layout() {
        let graph = GraphData::new(
            vec![GraphNode::new("A", 1), GraphNode::new("B", 0)],
            vec![vec![1]],
        );
        assert!(matches!(
            LayeredLayout::new().render(&graph),
            Err(InvalidGraphError::NonDescendingEdge { .. })
        ));
    }

    #[test]
    fn shared_ids_stay_unique_across_renders() {
        let graph = GraphData::new(
            vec![GraphNode::new("A", 0), GraphNode::new("B", 2)],
            vec![vec![1]],
        );
        let engine = LayeredLayout::new();
        let mut ids = VirtualIds::new();

        let first = engine.render_with_ids(&graph, &mut ids).unwrap();
        let second = engine.render_with_ids(&graph, &mut ids).unwrap();

        assert_eq!(first.nodes[&1][0].label(), "virtual-0");
        assert_eq!(second.nodes[&1][0].label(), "virtual-1");
    }

    #[test]
    fn engine_trait_matches_render() {
        let graph = GraphData::new(
            vec![GraphNode::new("A", 0), GraphNode::new("B", 1)],
            vec![vec![1]],
        );
        let engine = LayeredLayout::new();
        assert_eq!(engine.layout(&graph), engine.render(&graph));
    }
}
