//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the kairo crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use kairo::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/workspace.json")?;
//! let graph = SnapshotReader::new().read_str(&json)?;
//!
//! let program = Compiler::builder(&graph).with_main_block(false).build().compile()?;
//! println!("{}", program);
//! # Ok(())
//! # }
//! ```

// Graph model
pub use crate::graph::{Edge, EdgeId, Graph, Node, NodeId};

// Evaluation and compilation
pub use crate::compiler::{CompiledProgram, Compiler, Diagnostic};
pub use crate::engine::{Engine, EngineState, ValueChange};
pub use crate::resolver::Resolver;

// Node kinds and values
pub use crate::ast::Value;
pub use crate::semantics::{
    BooleanOp, ComparisonOp, ListConfig, ListOp, NodeKind, StringConfig, StringOp,
};

// Snapshots
pub use crate::snapshot::{FlowDocument, IntoGraph, SnapshotReader};

// Error types
pub use crate::error::{
    CompileError, EvaluationError, ExpressionError, GraphError, ResolveError, SnapshotError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
