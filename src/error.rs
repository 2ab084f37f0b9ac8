use crate::ast::Value;
use crate::graph::{EdgeId, NodeId};
use thiserror::Error;

/// Errors raised by structural edits of the graph store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node '{0}' already exists in the graph")]
    DuplicateNode(NodeId),

    #[error("Edge '{0}' already exists in the graph")]
    DuplicateEdge(EdgeId),

    #[error("Node '{0}' not found in the graph")]
    NodeNotFound(NodeId),

    #[error("Edge '{0}' not found in the graph")]
    EdgeNotFound(EdgeId),

    #[error(
        "Handle '{}' of node '{}' is already bound by edge '{}'",
        .handle.as_deref().unwrap_or("<default>"),
        .target,
        .occupied_by
    )]
    HandleOccupied {
        target: NodeId,
        handle: Option<String>,
        occupied_by: EdgeId,
    },
}

/// Errors raised while ordering dependencies.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Cycle detected: node '{node_id}' transitively feeds its own input")]
    CycleDetected { node_id: NodeId },

    #[error("Node '{0}' not found in the graph")]
    NodeNotFound(NodeId),
}

/// Errors that abort a live evaluation pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Cycle detected: node '{node_id}' transitively feeds its own input")]
    CycleDetected { node_id: NodeId },

    #[error("Node '{node_id}' has unknown kind '{type_name}' but its value is consumed downstream")]
    UnknownKind { node_id: NodeId, type_name: String },

    #[error("Node '{0}' not found in the graph")]
    NodeNotFound(NodeId),

    #[error("Node '{node_id}' is a computed '{kind}' node; only input nodes hold literals")]
    NotAnInput { node_id: NodeId, kind: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl From<ResolveError> for EvaluationError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::CycleDetected { node_id } => EvaluationError::CycleDetected { node_id },
            ResolveError::NodeNotFound(id) => EvaluationError::NodeNotFound(id),
        }
    }
}

/// Errors that abort code generation. Recoverable problems are reported as
/// [`Diagnostic`](crate::compiler::Diagnostic)s instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Cycle detected: node '{node_id}' transitively feeds its own input")]
    CycleDetected { node_id: NodeId },

    #[error("Node '{0}' not found in the graph")]
    NodeNotFound(NodeId),
}

impl From<ResolveError> for CompileError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::CycleDetected { node_id } => CompileError::CycleDetected { node_id },
            ResolveError::NodeNotFound(id) => CompileError::NodeNotFound(id),
        }
    }
}

/// Errors from parsing or running a MAP/FILTER expression in the sandbox.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Unexpected character '{found}' at position {position}")]
    UnexpectedCharacter { position: usize, found: char },

    #[error("Unterminated string literal starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("Unexpected token '{found}' at position {position}")]
    UnexpectedToken { position: usize, found: String },

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Expression nests deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("Unknown identifier '{0}'; only the element 'x' is in scope")]
    UnknownIdentifier(String),

    #[error(
        "Type mismatch during operation '{operation}': expected {expected}, but found value '{found}'"
    )]
    TypeMismatch {
        operation: String,
        expected: String,
        found: Value,
    },

    #[error("Division by zero")]
    DivisionByZero,
}

/// Errors that can occur when reading a snapshot document into a graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("Failed to parse snapshot JSON: {0}")]
    JsonParseError(String),

    #[error("Node '{node_id}' carries an invalid value: {message}")]
    InvalidValue { node_id: NodeId, message: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}
