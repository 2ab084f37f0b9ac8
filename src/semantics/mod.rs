//! The node semantics registry.
//!
//! [`NodeKind`] is a closed sum type. Every variant has exactly one live
//! evaluation rule ([`evaluate`]) and one code emission rule ([`emit`]),
//! both matched exhaustively, and both fed by the same [`Inputs`] binding.

mod emit;
mod evaluate;
mod inputs;
mod kind;

pub use emit::{Emission, Operand, TEXT_HELPER, emit, text_helper_source};
pub use evaluate::evaluate;
pub use inputs::Inputs;
pub use kind::{
    BooleanOp, ComparisonOp, DEFAULT_FILTER_EXPRESSION, DEFAULT_JOIN_DELIMITER,
    DEFAULT_MAP_EXPRESSION, ListConfig, ListOp, NodeKind, Slots, StringConfig, StringOp,
};
