use crate::ast::Value;
use crate::graph::NodeId;

/// Whether the engine's live values are consistent with its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Idle,
    /// A mutation was applied and its effects are being (or failed to be)
    /// propagated.
    Dirty,
}

/// Notification that a node's live value changed during a settle pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChange {
    pub node_id: NodeId,
    pub value: Value,
}
