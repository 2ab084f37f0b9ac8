use super::document::{FlowDocument, FlowEdge, FlowNode, FlowNodeData};
use crate::ast::Value;
use crate::graph::{Edge, Graph, Node};
use crate::semantics::NodeKind;

impl From<&Graph> for FlowDocument {
    /// Writes a graph back out in the shape [`super::SnapshotReader`] reads.
    /// Positions and viewport are left unset.
    fn from(graph: &Graph) -> Self {
        FlowDocument {
            nodes: graph.nodes().map(export_node).collect(),
            edges: graph.edges().map(export_edge).collect(),
            viewport: None,
        }
    }
}

fn export_node(node: &Node) -> FlowNode {
    let mut data = FlowNodeData {
        value: Some(json_value(&node.value)),
        name: node.name.clone(),
        ..FlowNodeData::default()
    };

    match &node.kind {
        NodeKind::Comparison(op) => data.operator = Some(op.to_string()),
        NodeKind::BooleanOperation(op) => data.operator = Some(op.to_string()),
        NodeKind::StringOperation(config) => {
            data.operator = Some(config.op.to_string());
            data.start_index = Some(config.start.into());
            data.end_index = config.end.map(Into::into);
            data.search_text = Some(config.search.clone());
            data.replace_text = Some(config.replace.clone());
            data.delimiter = Some(config.delimiter.clone());
        }
        NodeKind::ListOperation(config) => {
            data.list_operation = Some(config.op.to_string());
            data.push_value = Some(config.push_value.clone().into());
            data.map_function = Some(config.map_expression.clone());
            data.filter_condition = Some(config.filter_expression.clone());
            data.join_delimiter = Some(config.delimiter.clone());
            data.slice_range = Some(config.slice_range.clone());
        }
        _ => {}
    }

    FlowNode {
        id: node.id.to_string(),
        node_type: node.kind.type_name().to_string(),
        position: None,
        data,
    }
}

fn export_edge(edge: &Edge) -> FlowEdge {
    FlowEdge {
        id: edge.id.to_string(),
        source: edge.source.to_string(),
        target: edge.target.to_string(),
        source_handle: edge.source_handle.clone(),
        target_handle: edge.target_handle.clone(),
    }
}

/// Non-finite numbers have no JSON form and are written as `null`.
fn json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::List(items) => serde_json::Value::Array(items.iter().map(json_value).collect()),
    }
}
