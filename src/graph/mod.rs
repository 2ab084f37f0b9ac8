//! The graph store: nodes, handle-qualified edges, and nothing else.
//!
//! The store never interprets a node's kind; evaluation and code generation
//! query it explicitly.

pub mod edge;
pub mod node;
pub mod store;

pub use edge::{Edge, EdgeId};
pub use node::{Node, NodeId};
pub use store::Graph;
