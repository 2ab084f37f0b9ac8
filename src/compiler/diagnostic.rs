use crate::graph::NodeId;
use std::fmt;

/// A recoverable problem found while generating code.
///
/// Every diagnostic is also written into the program as a comment, so the
/// generated source stays valid and documents what was substituted.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A slot had no incoming edge; `substituted` is the literal used instead.
    MissingInput {
        node_id: NodeId,
        slot: &'static str,
        substituted: String,
    },
    /// A division was wrapped in a zero-divisor guard.
    DivisionGuard { node_id: NodeId },
    /// A node kind without an emission rule was replaced by a placeholder.
    UnknownKind { node_id: NodeId, type_name: String },
    /// Edges into the node that found no slot and are ignored.
    SurplusInputs { node_id: NodeId, count: usize },
}

impl Diagnostic {
    pub fn node_id(&self) -> &NodeId {
        match self {
            Diagnostic::MissingInput { node_id, .. }
            | Diagnostic::DivisionGuard { node_id }
            | Diagnostic::UnknownKind { node_id, .. }
            | Diagnostic::SurplusInputs { node_id, .. } => node_id,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingInput {
                node_id,
                slot,
                substituted,
            } => write!(
                f,
                "Missing input '{}' on node '{}', using {}",
                slot, node_id, substituted
            ),
            Diagnostic::DivisionGuard { .. } => write!(f, "Prevent division by zero"),
            Diagnostic::UnknownKind { type_name, .. } => {
                write!(f, "Unknown node type: {}", type_name)
            }
            Diagnostic::SurplusInputs { node_id, count } => write!(
                f,
                "Ignoring {} extra input(s) on node '{}'",
                count, node_id
            ),
        }
    }
}
