use serde::{Deserialize, Serialize};

/// A saved editor workspace: nodes, edges and the canvas viewport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowDocument {
    #[serde(default)]
    pub nodes: Vec<FlowNode>,
    #[serde(default)]
    pub edges: Vec<FlowEdge>,
    /// Canvas state, carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<serde_json::Value>,
    #[serde(default)]
    pub data: FlowNodeData,
}

/// Per-node settings. Which fields matter depends on the node type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_delimiter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slice_range: Option<String>,
    /// A number, or text holding one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_index: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    /// Generated from the endpoints when absent.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl FlowDocument {
    pub fn from_json(json: &str) -> Result<Self, crate::error::SnapshotError> {
        serde_json::from_str(json)
            .map_err(|e| crate::error::SnapshotError::JsonParseError(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, crate::error::SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::error::SnapshotError::JsonParseError(e.to_string()))
    }
}
