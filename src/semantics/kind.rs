use crate::ast::{Value, ValueType};
use std::fmt;
use std::str::FromStr;

/// Defines an operator selector enum with its wire spelling, `FromStr`,
/// `Display`, and the list of all variants.
macro_rules! define_operators {
    ( $( $(#[$meta:meta])* $name:ident { $( $variant:ident => $text:literal ),* $(,)? } )* ) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum $name {
                $( $variant, )*
            }

            impl $name {
                pub const ALL: &'static [$name] = &[ $( $name::$variant, )* ];

                pub fn as_str(self) -> &'static str {
                    match self {
                        $( $name::$variant => $text, )*
                    }
                }
            }

            impl FromStr for $name {
                type Err = String;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    match s {
                        $( $text => Ok($name::$variant), )*
                        other => Err(format!(
                            "unknown {} '{}'",
                            stringify!($name),
                            other
                        )),
                    }
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

define_operators! {
    /// Operator of a Comparison node.
    ComparisonOp {
        Equal => "==",
        NotEqual => "!=",
        Less => "<",
        Greater => ">",
        LessOrEqual => "<=",
        GreaterOrEqual => ">=",
    }

    /// Operator of a BooleanOperation node.
    BooleanOp {
        And => "AND",
        Or => "OR",
        Not => "NOT",
        Xor => "XOR",
        Nand => "NAND",
        Nor => "NOR",
    }

    /// Operator of a StringOperation node.
    StringOp {
        Concat => "CONCAT",
        Length => "LENGTH",
        Substring => "SUBSTRING",
        Uppercase => "UPPERCASE",
        Lowercase => "LOWERCASE",
        Replace => "REPLACE",
        Split => "SPLIT",
        Join => "JOIN",
        Trim => "TRIM",
        Contains => "CONTAINS",
    }

    /// Operator of a ListOperation node.
    ListOp {
        Push => "PUSH",
        Pop => "POP",
        Map => "MAP",
        Filter => "FILTER",
        Length => "LENGTH",
        Join => "JOIN",
        Slice => "SLICE",
        Reverse => "REVERSE",
        Sort => "SORT",
    }
}

impl Default for ComparisonOp {
    fn default() -> Self {
        ComparisonOp::Equal
    }
}

impl Default for BooleanOp {
    fn default() -> Self {
        BooleanOp::And
    }
}

impl BooleanOp {
    pub fn is_unary(self) -> bool {
        self == BooleanOp::Not
    }
}

/// Configuration of a StringOperation node.
#[derive(Debug, Clone, PartialEq)]
pub struct StringConfig {
    pub op: StringOp,
    pub start: i64,
    /// `None` (or 0) reads to the end of the text.
    pub end: Option<i64>,
    pub search: String,
    pub replace: String,
    pub delimiter: String,
}

impl StringConfig {
    pub fn new(op: StringOp) -> Self {
        Self {
            op,
            start: 0,
            end: None,
            search: String::new(),
            replace: String::new(),
            delimiter: String::new(),
        }
    }

    pub fn with_range(mut self, start: i64, end: Option<i64>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>, replace: impl Into<String>) -> Self {
        self.search = search.into();
        self.replace = replace.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// The end index with 0 normalised to "to the end".
    pub fn effective_end(&self) -> Option<i64> {
        self.end.filter(|e| *e != 0)
    }
}

impl Default for StringConfig {
    fn default() -> Self {
        Self::new(StringOp::Concat)
    }
}

pub const DEFAULT_MAP_EXPRESSION: &str = "x * 2";
pub const DEFAULT_FILTER_EXPRESSION: &str = "x > 0";
pub const DEFAULT_JOIN_DELIMITER: &str = ",";

/// Configuration of a ListOperation node.
#[derive(Debug, Clone, PartialEq)]
pub struct ListConfig {
    pub op: ListOp,
    /// Text of the pushed element; numeric text is pushed as a number.
    pub push_value: String,
    pub map_expression: String,
    pub filter_expression: String,
    pub delimiter: String,
    /// `"start, end"`, either part optional.
    pub slice_range: String,
}

impl ListConfig {
    pub fn new(op: ListOp) -> Self {
        Self {
            op,
            push_value: String::new(),
            map_expression: DEFAULT_MAP_EXPRESSION.to_string(),
            filter_expression: DEFAULT_FILTER_EXPRESSION.to_string(),
            delimiter: DEFAULT_JOIN_DELIMITER.to_string(),
            slice_range: String::new(),
        }
    }

    pub fn with_push_value(mut self, value: impl Into<String>) -> Self {
        self.push_value = value.into();
        self
    }

    pub fn with_map(mut self, expression: impl Into<String>) -> Self {
        self.map_expression = expression.into();
        self
    }

    pub fn with_filter(mut self, expression: impl Into<String>) -> Self {
        self.filter_expression = expression.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_slice(mut self, range: impl Into<String>) -> Self {
        self.slice_range = range.into();
        self
    }

    /// The value PUSH appends: a number when the text parses as one.
    pub fn push_literal(&self) -> Value {
        let trimmed = self.push_value.trim();
        if trimmed.is_empty() {
            return Value::Number(0.0);
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(self.push_value.clone()),
        }
    }

    /// Parses the slice range into optional `(start, end)` bounds. Parts that
    /// are not integers are dropped, and a lone integer is the start.
    pub fn slice_bounds(&self) -> (Option<i64>, Option<i64>) {
        let parts: Vec<i64> = self
            .slice_range
            .split(',')
            .filter_map(|p| p.trim().parse::<i64>().ok())
            .collect();
        (parts.first().copied(), parts.get(1).copied())
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self::new(ListOp::Push)
    }
}

/// How a kind binds its incoming edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slots {
    /// Holds a user literal and takes no inputs.
    None,
    /// Takes every incoming edge in connection order.
    Variadic,
    /// Named slots, bound by handle first and by position second.
    Named(&'static [&'static str]),
}

/// The closed set of node kinds. Each variant carries its own configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    NumberInput,
    StringInput,
    BooleanInput,
    ListInput,
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Comparison(ComparisonOp),
    BooleanOperation(BooleanOp),
    StringOperation(StringConfig),
    ListOperation(ListConfig),
    IfElse,
    Display,
    /// A kind name this registry does not know.
    Unknown(String),
}

const BINARY_SLOTS: &[&str] = &["a", "b"];
const LEFT_RIGHT_SLOTS: &[&str] = &["left", "right"];
const LEFT_SLOT: &[&str] = &["left"];
const TARGET_SLOT: &[&str] = &["target"];
const IF_ELSE_SLOTS: &[&str] = &["condition", "true", "false"];
const DISPLAY_SLOT: &[&str] = &["input"];

impl NodeKind {
    /// Builds a kind with default configuration from its snapshot type name.
    pub fn from_type_name(name: &str) -> NodeKind {
        match name {
            "numberInput" => NodeKind::NumberInput,
            "stringInput" => NodeKind::StringInput,
            "booleanInput" => NodeKind::BooleanInput,
            "listInput" => NodeKind::ListInput,
            "addition" => NodeKind::Addition,
            "subtraction" => NodeKind::Subtraction,
            "multiplication" => NodeKind::Multiplication,
            "division" => NodeKind::Division,
            "comparison" => NodeKind::Comparison(ComparisonOp::default()),
            "booleanOperation" => NodeKind::BooleanOperation(BooleanOp::default()),
            "stringOperation" => NodeKind::StringOperation(StringConfig::default()),
            "listOperation" => NodeKind::ListOperation(ListConfig::default()),
            "ifElse" => NodeKind::IfElse,
            "display" => NodeKind::Display,
            other => NodeKind::Unknown(other.to_string()),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            NodeKind::NumberInput => "numberInput",
            NodeKind::StringInput => "stringInput",
            NodeKind::BooleanInput => "booleanInput",
            NodeKind::ListInput => "listInput",
            NodeKind::Addition => "addition",
            NodeKind::Subtraction => "subtraction",
            NodeKind::Multiplication => "multiplication",
            NodeKind::Division => "division",
            NodeKind::Comparison(_) => "comparison",
            NodeKind::BooleanOperation(_) => "booleanOperation",
            NodeKind::StringOperation(_) => "stringOperation",
            NodeKind::ListOperation(_) => "listOperation",
            NodeKind::IfElse => "ifElse",
            NodeKind::Display => "display",
            NodeKind::Unknown(name) => name,
        }
    }

    /// Input kinds hold a user-entered literal instead of a computed value.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            NodeKind::NumberInput
                | NodeKind::StringInput
                | NodeKind::BooleanInput
                | NodeKind::ListInput
        )
    }

    pub fn input_slots(&self) -> Slots {
        match self {
            NodeKind::NumberInput
            | NodeKind::StringInput
            | NodeKind::BooleanInput
            | NodeKind::ListInput
            | NodeKind::Unknown(_) => Slots::None,
            NodeKind::Addition | NodeKind::Multiplication => Slots::Variadic,
            NodeKind::Subtraction | NodeKind::Division => Slots::Named(BINARY_SLOTS),
            NodeKind::Comparison(_) => Slots::Named(LEFT_RIGHT_SLOTS),
            NodeKind::BooleanOperation(op) if op.is_unary() => Slots::Named(LEFT_SLOT),
            NodeKind::BooleanOperation(_) => Slots::Named(LEFT_RIGHT_SLOTS),
            NodeKind::StringOperation(cfg) if cfg.op == StringOp::Concat => {
                Slots::Named(LEFT_RIGHT_SLOTS)
            }
            NodeKind::StringOperation(_) => Slots::Named(LEFT_SLOT),
            NodeKind::ListOperation(_) => Slots::Named(TARGET_SLOT),
            NodeKind::IfElse => Slots::Named(IF_ELSE_SLOTS),
            NodeKind::Display => Slots::Named(DISPLAY_SLOT),
        }
    }

    /// Type of the value this kind produces when nothing is connected.
    pub fn output_type(&self) -> ValueType {
        match self {
            NodeKind::StringInput | NodeKind::Display => ValueType::Text,
            NodeKind::BooleanInput | NodeKind::Comparison(_) | NodeKind::BooleanOperation(_) => {
                ValueType::Bool
            }
            NodeKind::ListInput => ValueType::List,
            NodeKind::StringOperation(cfg) => match cfg.op {
                StringOp::Length => ValueType::Number,
                StringOp::Contains => ValueType::Bool,
                StringOp::Split => ValueType::List,
                _ => ValueType::Text,
            },
            NodeKind::ListOperation(cfg) => match cfg.op {
                ListOp::Length => ValueType::Number,
                ListOp::Join => ValueType::Text,
                _ => ValueType::List,
            },
            NodeKind::NumberInput
            | NodeKind::Addition
            | NodeKind::Subtraction
            | NodeKind::Multiplication
            | NodeKind::Division
            | NodeKind::IfElse
            | NodeKind::Unknown(_) => ValueType::Number,
        }
    }

    pub fn default_value(&self) -> Value {
        self.output_type().default_value()
    }

    /// Converts a user-entered literal to the type this input kind holds.
    /// Computed kinds keep the value as given.
    pub fn coerce_literal(&self, value: Value) -> Value {
        match (self, value) {
            (NodeKind::NumberInput, Value::Number(n)) => Value::Number(n),
            (NodeKind::NumberInput, other) => Value::Number(other.as_number()),
            (NodeKind::StringInput, other) => Value::Text(other.to_text()),
            (NodeKind::BooleanInput, Value::Text(text)) => {
                Value::Bool(text.trim().eq_ignore_ascii_case("true"))
            }
            (NodeKind::BooleanInput, other) => Value::Bool(other.is_truthy()),
            (NodeKind::ListInput, Value::Text(text)) => Value::List(Value::parse_list(&text)),
            (NodeKind::ListInput, other) => Value::List(other.to_list()),
            (_, other) => other,
        }
    }

    /// Prefix of the variables generated for this kind.
    pub fn variable_prefix(&self) -> &'static str {
        match self {
            NodeKind::NumberInput => "num",
            NodeKind::StringInput => "str",
            NodeKind::BooleanInput => "bool",
            NodeKind::ListInput => "list",
            NodeKind::Addition => "sum",
            NodeKind::Subtraction => "diff",
            NodeKind::Multiplication => "product",
            NodeKind::Division => "quotient",
            NodeKind::Comparison(_) | NodeKind::BooleanOperation(_) => "bool_result",
            NodeKind::StringOperation(_) => "str_result",
            NodeKind::ListOperation(_) => "list_result",
            NodeKind::IfElse | NodeKind::Display | NodeKind::Unknown(_) => "result",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Comparison(op) => write!(f, "comparison({})", op),
            NodeKind::BooleanOperation(op) => write!(f, "booleanOperation({})", op),
            NodeKind::StringOperation(cfg) => write!(f, "stringOperation({})", cfg.op),
            NodeKind::ListOperation(cfg) => write!(f, "listOperation({})", cfg.op),
            other => f.write_str(other.type_name()),
        }
    }
}
