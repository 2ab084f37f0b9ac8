use super::document::{FlowDocument, FlowEdge, FlowNode, FlowNodeData};
use crate::ast::Value;
use crate::error::SnapshotError;
use crate::graph::{Edge, Graph, Node, NodeId};
use crate::semantics::{ListConfig, ListOp, NodeKind, StringConfig, StringOp};
use ahash::AHashMap;
use std::str::FromStr;
use tracing::{debug, warn};

/// Turns snapshot documents into graphs.
///
/// Node type names are looked up in the alias table first, so workspaces
/// saved by other editors can reuse the built-in kinds.
///
/// ```rust
/// use kairo::snapshot::SnapshotReader;
///
/// let json = r#"{
///     "nodes": [
///         { "id": "a", "type": "number", "data": { "value": 5 } },
///         { "id": "b", "type": "display", "data": {} }
///     ],
///     "edges": [ { "id": "e1", "source": "a", "target": "b" } ]
/// }"#;
///
/// let graph = SnapshotReader::new()
///     .with_kind_alias("number", "numberInput")
///     .read_str(json)
///     .unwrap();
/// assert_eq!(graph.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SnapshotReader {
    aliases: AHashMap<String, String>,
}

impl SnapshotReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads nodes of type `alias` as the built-in kind named `kind`.
    pub fn with_kind_alias(mut self, alias: impl Into<String>, kind: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), kind.into());
        self
    }

    pub fn read_str(&self, json: &str) -> Result<Graph, SnapshotError> {
        self.read_document(FlowDocument::from_json(json)?)
    }

    pub fn read_document(&self, document: FlowDocument) -> Result<Graph, SnapshotError> {
        let mut graph = Graph::new();
        for node in document.nodes {
            graph.add_node(self.read_node(node)?)?;
        }
        for edge in document.edges {
            read_edge(&mut graph, edge)?;
        }
        debug!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            "snapshot loaded"
        );
        Ok(graph)
    }

    fn read_node(&self, node: FlowNode) -> Result<Node, SnapshotError> {
        let type_name = self
            .aliases
            .get(&node.node_type)
            .map(String::as_str)
            .unwrap_or(&node.node_type);
        let id = NodeId::new(node.id);
        let data = node.data;

        let kind = configure(&id, NodeKind::from_type_name(type_name), &data)?;
        if let NodeKind::Unknown(name) = &kind {
            warn!(node = %id, kind = %name, "snapshot node has an unknown type");
        }

        let mut built = Node::new(id, kind);
        if built.kind.is_input() {
            if let Some(value) = literal(&built.id, data.value.as_ref())? {
                built.value = built.kind.coerce_literal(value);
            }
        }
        built.name = data.name.filter(|name| !name.trim().is_empty());
        Ok(built)
    }
}

fn read_edge(graph: &mut Graph, edge: FlowEdge) -> Result<(), SnapshotError> {
    if edge.id.is_empty() {
        graph.connect(&edge.source, &edge.target, edge.target_handle.as_deref())?;
        return Ok(());
    }
    let mut built = Edge::new(edge.id, edge.source, edge.target);
    built.source_handle = edge.source_handle;
    built.target_handle = edge.target_handle;
    graph.add_edge(built)?;
    Ok(())
}

/// Applies the operator and option fields of `data` to a default kind.
fn configure(id: &NodeId, kind: NodeKind, data: &FlowNodeData) -> Result<NodeKind, SnapshotError> {
    let kind = match kind {
        NodeKind::Comparison(op) => NodeKind::Comparison(operator(id, data.operator.as_deref(), op)?),
        NodeKind::BooleanOperation(op) => {
            NodeKind::BooleanOperation(operator(id, data.operator.as_deref(), op)?)
        }
        NodeKind::StringOperation(_) => {
            let op = operator(id, data.operator.as_deref(), StringOp::Concat)?;
            let mut config = StringConfig::new(op)
                .with_range(
                    index(data.start_index.as_ref()).unwrap_or(0),
                    index(data.end_index.as_ref()),
                )
                .with_search(
                    data.search_text.clone().unwrap_or_default(),
                    data.replace_text.clone().unwrap_or_default(),
                );
            if let Some(delimiter) = &data.delimiter {
                config = config.with_delimiter(delimiter.clone());
            }
            NodeKind::StringOperation(config)
        }
        NodeKind::ListOperation(_) => {
            let op = operator(id, data.list_operation.as_deref(), ListOp::Push)?;
            let mut config = ListConfig::new(op);
            if let Some(value) = &data.push_value {
                config = config.with_push_value(json_text(value));
            }
            if let Some(expression) = &data.map_function {
                config = config.with_map(expression.clone());
            }
            if let Some(condition) = &data.filter_condition {
                config = config.with_filter(condition.clone());
            }
            if let Some(delimiter) = &data.join_delimiter {
                config = config.with_delimiter(delimiter.clone());
            }
            if let Some(range) = &data.slice_range {
                config = config.with_slice(range.clone());
            }
            NodeKind::ListOperation(config)
        }
        other => other,
    };
    Ok(kind)
}

fn operator<T>(id: &NodeId, text: Option<&str>, default: T) -> Result<T, SnapshotError>
where
    T: FromStr<Err = String>,
{
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        None => Ok(default),
        Some(text) => T::from_str(text).map_err(|message| SnapshotError::InvalidValue {
            node_id: id.clone(),
            message,
        }),
    }
}

/// Reads a string index given as a number or as numeric text. Anything
/// else counts as unset.
fn index(value: Option<&serde_json::Value>) -> Option<i64> {
    match value? {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Converts a stored literal. `null` means "not set".
fn literal(id: &NodeId, value: Option<&serde_json::Value>) -> Result<Option<Value>, SnapshotError> {
    let invalid = |message: String| SnapshotError::InvalidValue {
        node_id: id.clone(),
        message,
    };
    let value = match value {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::Bool(b)) => Value::Bool(*b),
        Some(serde_json::Value::Number(n)) => Value::Number(
            n.as_f64()
                .ok_or_else(|| invalid(format!("number {} is out of range", n)))?,
        ),
        Some(serde_json::Value::String(s)) => Value::Text(s.clone()),
        Some(array @ serde_json::Value::Array(_)) => Value::List(
            serde_json::from_value(array.clone()).map_err(|e| invalid(e.to_string()))?,
        ),
        Some(serde_json::Value::Object(_)) => {
            return Err(invalid("objects are not valid literals".to_string()));
        }
    };
    Ok(Some(value))
}
