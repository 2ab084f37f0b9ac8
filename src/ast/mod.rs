pub mod expression;
pub mod parser;
pub mod sandbox;
pub mod value;

pub use expression::*;
pub use parser::{ELEMENT_NAME, MAX_NESTING, parse_expression};
pub use sandbox::Sandbox;
pub use value::{Value, ValueType};
