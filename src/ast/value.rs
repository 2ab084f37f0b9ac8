use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Runtime value carried by every node of a graph.
///
/// Text rendering follows Python's `str()` so that the live preview reads the
/// same as the output of the generated program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
    List(Vec<Value>),
}

/// The four shapes a [`Value`] can take, used to pick kind defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Number,
    Text,
    Bool,
    List,
}

impl ValueType {
    /// The value an unconnected input of this type falls back to.
    pub fn default_value(self) -> Value {
        match self {
            ValueType::Number => Value::Number(0.0),
            ValueType::Text => Value::Text(String::new()),
            ValueType::Bool => Value::Bool(false),
            ValueType::List => Value::List(Vec::new()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Number => "number",
            ValueType::Text => "text",
            ValueType::Bool => "bool",
            ValueType::List => "list",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Number(0.0)
    }
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Number(_) => ValueType::Number,
            Value::Text(_) => ValueType::Text,
            Value::Bool(_) => ValueType::Bool,
            Value::List(_) => ValueType::List,
        }
    }

    /// Numeric coercion: booleans count as 1/0, text is parsed (0 when it
    /// is not a number), lists are 0.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Text(s) => s.trim().parse().unwrap_or(0.0),
            Value::List(_) => 0.0,
        }
    }

    /// Python truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0,
            Value::Bool(b) => *b,
            Value::Text(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }

    /// The value as text, as Python's `str()` renders it.
    pub fn to_text(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// The value viewed as a list. Scalars become a one-element list.
    pub fn to_list(&self) -> Vec<Value> {
        match self {
            Value::List(items) => items.clone(),
            other => vec![other.clone()],
        }
    }

    /// Python-style comparison. `None` for types Python refuses to order.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(_) | Value::Bool(_), Value::Number(_) | Value::Bool(_)) => {
                self.as_number().partial_cmp(&other.as_number())
            }
            (Value::Text(l), Value::Text(r)) => Some(l.cmp(r)),
            (Value::List(l), Value::List(r)) => {
                for (a, b) in l.iter().zip(r) {
                    match a.compare(b)? {
                        Ordering::Equal => continue,
                        decided => return Some(decided),
                    }
                }
                Some(l.len().cmp(&r.len()))
            }
            _ => None,
        }
    }

    /// Python `==`: numbers and booleans compare by value, other mixed types
    /// are never equal.
    pub fn loosely_equals(&self, other: &Value) -> bool {
        matches!(self.compare(other), Some(Ordering::Equal))
    }

    /// Total order used by list sorting: numbers, then text, then lists.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Number(_) | Value::Bool(_) => 0,
                Value::Text(_) => 1,
                Value::List(_) => 2,
            }
        }
        rank(self)
            .cmp(&rank(other))
            .then_with(|| self.compare(other).unwrap_or(Ordering::Equal))
    }

    /// Renders the value as a Python literal expression.
    pub fn python_literal(&self) -> String {
        match self {
            Value::Number(n) if n.is_nan() => "float('nan')".to_string(),
            Value::Number(n) if n.is_infinite() => {
                if *n > 0.0 {
                    "float('inf')".to_string()
                } else {
                    "float('-inf')".to_string()
                }
            }
            Value::Number(n) => format_number(*n),
            Value::Text(s) => python_string(s),
            Value::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            Value::List(items) => {
                let inner: Vec<String> = items.iter().map(Value::python_literal).collect();
                format!("[{}]", inner.join(", "))
            }
        }
    }

    /// Whether [`Value::python_literal`] writes a float, or a list holding
    /// one.
    pub fn has_float_literal(&self) -> bool {
        match self {
            Value::Number(n) => !renders_as_int(*n),
            Value::List(items) => items.iter().any(Value::has_float_literal),
            Value::Text(_) | Value::Bool(_) => false,
        }
    }

    /// Reads a list literal: a JSON array, or comma-separated items where
    /// numeric items become numbers. Blank text is the empty list.
    pub fn parse_list(text: &str) -> Vec<Value> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        if trimmed.starts_with('[') {
            if let Ok(items) = serde_json::from_str::<Vec<Value>>(trimmed) {
                return items;
            }
        }
        trimmed
            .split(',')
            .map(|item| {
                let item = item.trim();
                match item.parse::<f64>() {
                    Ok(n) if n.is_finite() && !item.is_empty() => Value::Number(n),
                    _ => Value::Text(item.to_string()),
                }
            })
            .collect()
    }

    /// Python `repr()`, used for elements inside a rendered list.
    fn repr(&self) -> String {
        match self {
            Value::Text(s) => python_repr(s),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) if n.is_nan() => write!(f, "nan"),
            Value::Number(n) if n.is_infinite() => {
                write!(f, "{}", if *n > 0.0 { "inf" } else { "-inf" })
            }
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item.repr())?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// Integral numbers below this magnitude render without a fraction, as
/// Python ints do. Anything else renders as a Python float.
const INT_LIMIT: f64 = 1e16;

fn renders_as_int(n: f64) -> bool {
    n.fract() == 0.0 && n.abs() < INT_LIMIT
}

// Finite numbers only; callers handle nan and the infinities.
fn format_number(n: f64) -> String {
    let magnitude = n.abs();
    if renders_as_int(n) {
        format!("{}", n as i64)
    } else if magnitude >= INT_LIMIT || magnitude < 1e-4 {
        python_exponent(n)
    } else {
        format!("{}", n)
    }
}

/// Python's exponent notation, such as `1e+16` or `2.5e-05`.
fn python_exponent(n: f64) -> String {
    let formatted = format!("{:e}", n);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => formatted,
    }
}

/// A double-quoted Python string literal.
pub(crate) fn python_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        push_escaped(&mut out, c, '"');
    }
    out.push('"');
    out
}

/// Python's `repr()` of a string: single quotes unless the text contains a
/// single quote and no double quote.
fn python_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        push_escaped(&mut out, c, quote);
    }
    out.push(quote);
    out
}

fn push_escaped(out: &mut String, c: char, quote: char) {
    match c {
        '\\' => out.push_str("\\\\"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c if c == quote => {
            out.push('\\');
            out.push(c);
        }
        c if (c as u32) < 0x20 || c as u32 == 0x7f => {
            out.push_str(&format!("\\x{:02x}", c as u32));
        }
        c => out.push(c),
    }
}
