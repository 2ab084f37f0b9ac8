//! # Kairo - Dataflow Graph Compiler
//!
//! **Kairo** keeps a directed graph of typed computation nodes (numeric,
//! boolean, string, list, conditional and display nodes), evaluates it live
//! as the graph is edited, and compiles it into a standalone Python program
//! that computes the same values.
//!
//! ## Core Workflow
//!
//! 1.  **Load a graph**: Read an editor snapshot with [`snapshot::SnapshotReader`],
//!     implement [`snapshot::IntoGraph`] for your own format, or build a
//!     [`graph::Graph`] by hand.
//! 2.  **Evaluate**: Wrap it in an [`engine::Engine`]. Every edit recomputes the
//!     affected nodes in dependency order and reports the values that changed.
//! 3.  **Compile**: Use [`compiler::Compiler::builder`] to generate the Python
//!     source for the current graph.
//!
//! ## Quick Start
//!
//! ```rust
//! use kairo::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let mut graph = Graph::new();
//! graph.add_node(Node::new("five", NodeKind::NumberInput).with_value(5.0))?;
//! graph.add_node(Node::new("three", NodeKind::NumberInput).with_value(3.0))?;
//! graph.add_node(Node::new("sum", NodeKind::Addition))?;
//! graph.add_node(Node::new("out", NodeKind::Display))?;
//! graph.connect("five", "sum", None)?;
//! graph.connect("three", "sum", None)?;
//! graph.connect("sum", "out", None)?;
//!
//! let mut engine = Engine::new(graph);
//! engine.settle_all()?;
//! assert_eq!(engine.value_of("out"), Some(&Value::Number(8.0)));
//!
//! let program = engine.compile()?;
//! assert!(program.source.contains("sum_3 = num_1 + num_2"));
//! assert!(program.source.contains("print(sum_3)"));
//! # Ok(())
//! # }
//! ```

pub mod ast;
pub mod compiler;
pub mod engine;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod resolver;
pub mod semantics;
pub mod snapshot;
