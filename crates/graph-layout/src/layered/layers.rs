use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{IntoNeighborsDirected, IntoNodeIdentifiers};
use petgraph::Direction;
use std::collections::HashMap;
use std::hash::Hash;

/// Assign each node to the layer after its deepest predecessor
///
/// Roots land on layer 0. Nodes are returned in `node_identifiers` order so
/// that the caller's ordering survives into the initial placement.
///
/// On a cycle, the offending node is returned as the error.
pub(crate) fn assign_layers<G>(graph: G) -> Result<Vec<(G::NodeId, usize)>, G::NodeId>
where
    G: IntoNodeIdentifiers + IntoNeighborsDirected,
    G::NodeId: Copy + Ord + Hash,
{
    // Convert to DiGraphMap for toposort
    let mut dag = DiGraphMap::new();
    for node in graph.node_identifiers() {
        dag.add_node(node);
    }
    for node in graph.node_identifiers() {
        for succ in graph.neighbors_directed(node, Direction::Outgoing) {
            dag.add_edge(node, succ, ());
        }
    }

    let topo_order = toposort(&dag, None).map_err(|cycle| cycle.node_id())?;

    let mut layer_map: HashMap<G::NodeId, usize> = HashMap::new();
    for &node in &topo_order {
        let layer = dag
            .neighbors_directed(node, Direction::Incoming)
            .map(|pred| layer_map.get(&pred).map_or(0, |layer| layer + 1))
            .max()
            .unwrap_or(0);
        layer_map.insert(node, layer);
    }

    Ok(graph
        .node_identifiers()
        .map(|node| (node, layer_map.get(&node).copied().unwrap_or(0)))
        .collect())
}
