/// A layout engine that can compute a drawing for some graph input
///
/// This trait is generic over the graph type `G` so that engines with
/// different input requirements share a single entry point.
pub trait LayoutEngine<G> {
    /// The computed drawing
    type Output;

    /// The error returned when the input violates the engine's requirements
    type Error;

    /// Compute the layout for the given graph
    ///
    /// # Errors
    /// Returns an error if the graph does not satisfy the engine's
    /// structural constraints (e.g. cycles for DAG layouts)
    fn layout(&self, graph: G) -> Result<Self::Output, Self::Error>;
}
