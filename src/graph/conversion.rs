use super::definition::GraphStructure;
use crate::error::ConversionError;

/// A trait for custom data models that can be converted into a `GraphStructure`.
///
/// This is the extension point for feeding grading models stored in other formats
/// into the validator. The editor's own JSON format implements it in
/// [`crate::ui::UiGraph`].
///
/// # Example
///
/// ```rust,no_run
/// use gradeflow::error::ConversionError;
/// use gradeflow::graph::*;
///
/// // 1. Your own representation of a grading model.
/// struct StoredModel {
///     parts: Vec<String>,
/// }
///
/// // 2. Translate it into the canonical graph.
/// impl IntoGraph for StoredModel {
///     fn into_graph(self) -> Result<GraphStructure, ConversionError> {
///         let mut nodes = vec![
///             GraphNode::new("final-grade", NodeSettings::Sink),
///             GraphNode::new("sum", NodeSettings::Addition),
///         ];
///         let mut edges = vec![GraphEdge::new("sum", "final-grade", 0)];
///         for (slot, part) in self.parts.into_iter().enumerate() {
///             edges.push(GraphEdge::new(part.clone(), "sum", slot as u32));
///             nodes.push(GraphNode::new(part, NodeSettings::Source(SourceSettings::default())));
///         }
///         Ok(GraphStructure::new(nodes, edges))
///     }
/// }
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into a grading model graph.
    fn into_graph(self) -> Result<GraphStructure, ConversionError>;
}

impl IntoGraph for GraphStructure {
    fn into_graph(self) -> Result<GraphStructure, ConversionError> {
        Ok(self)
    }
}
