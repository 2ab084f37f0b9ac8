//! Reading and writing editor workspace snapshots.

mod document;
mod export;
mod reader;

pub use document::{FlowDocument, FlowEdge, FlowNode, FlowNodeData};
pub use reader::SnapshotReader;

use crate::error::SnapshotError;
use crate::graph::Graph;

/// A trait for custom workspace formats that can be converted into a [`Graph`].
///
/// Implement it on your own document structs to feed them to the engine and
/// the compiler without going through [`FlowDocument`].
///
/// ```rust
/// use kairo::error::SnapshotError;
/// use kairo::graph::{Graph, Node};
/// use kairo::semantics::NodeKind;
/// use kairo::snapshot::IntoGraph;
///
/// struct Constants(Vec<f64>);
///
/// impl IntoGraph for Constants {
///     fn into_graph(self) -> Result<Graph, SnapshotError> {
///         let mut graph = Graph::new();
///         for (i, n) in self.0.into_iter().enumerate() {
///             graph.add_node(Node::new(format!("c{}", i), NodeKind::NumberInput).with_value(n))?;
///         }
///         Ok(graph)
///     }
/// }
///
/// let graph = Constants(vec![1.0, 2.0]).into_graph().unwrap();
/// assert_eq!(graph.len(), 2);
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into a graph.
    fn into_graph(self) -> Result<Graph, SnapshotError>;
}

impl IntoGraph for FlowDocument {
    fn into_graph(self) -> Result<Graph, SnapshotError> {
        SnapshotReader::new().read_document(self)
    }
}

impl IntoGraph for Graph {
    fn into_graph(self) -> Result<Graph, SnapshotError> {
        Ok(self)
    }
}

/// Parses a snapshot JSON document with the built-in kind names.
pub fn from_json(json: &str) -> Result<Graph, SnapshotError> {
    SnapshotReader::new().read_str(json)
}

/// Serializes a graph as a pretty-printed snapshot document.
pub fn to_json(graph: &Graph) -> Result<String, SnapshotError> {
    FlowDocument::from(graph).to_json()
}
