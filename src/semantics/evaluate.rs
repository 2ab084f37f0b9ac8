use super::{
    BooleanOp, ComparisonOp, Inputs, ListConfig, ListOp, NodeKind, StringConfig, StringOp,
};
use crate::ast::{Sandbox, Value, parse_expression};
use std::cmp::Ordering;
use tracing::debug;

/// Computes a node's live value from its bound inputs.
///
/// Input kinds return their stored literal. Unknown kinds have no rule and
/// yield their default; callers decide whether that is acceptable.
pub fn evaluate(kind: &NodeKind, literal: &Value, inputs: &Inputs<Value>) -> Value {
    match kind {
        NodeKind::NumberInput
        | NodeKind::StringInput
        | NodeKind::BooleanInput
        | NodeKind::ListInput => literal.clone(),

        NodeKind::Addition => {
            let sum = inputs.variadic().iter().map(Value::as_number).sum();
            Value::Number(sum)
        }
        NodeKind::Multiplication => match inputs.variadic() {
            [] => Value::Number(0.0),
            values => Value::Number(values.iter().map(Value::as_number).product()),
        },
        NodeKind::Subtraction => Value::Number(number(inputs, "a") - number(inputs, "b")),
        NodeKind::Division => {
            let divisor = number(inputs, "b");
            if divisor == 0.0 {
                Value::Number(0.0)
            } else {
                Value::Number(number(inputs, "a") / divisor)
            }
        }

        NodeKind::Comparison(op) => {
            let zero = Value::Number(0.0);
            let left = inputs.get("left").unwrap_or(&zero);
            let right = inputs.get("right").unwrap_or(&zero);
            Value::Bool(compare(*op, left, right))
        }

        NodeKind::BooleanOperation(op) => {
            let a = truthy(inputs, "left");
            let b = truthy(inputs, "right");
            Value::Bool(match op {
                BooleanOp::And => a && b,
                BooleanOp::Or => a || b,
                BooleanOp::Not => !a,
                BooleanOp::Xor => a != b,
                BooleanOp::Nand => !(a && b),
                BooleanOp::Nor => !(a || b),
            })
        }

        NodeKind::StringOperation(cfg) => string_operation(cfg, inputs),
        NodeKind::ListOperation(cfg) => list_operation(cfg, inputs),

        NodeKind::IfElse => {
            let branch = if truthy(inputs, "condition") {
                "true"
            } else {
                "false"
            };
            inputs
                .get(branch)
                .cloned()
                .unwrap_or(Value::Number(0.0))
        }

        NodeKind::Display => inputs
            .get("input")
            .cloned()
            .unwrap_or_else(|| Value::Text(String::new())),

        NodeKind::Unknown(_) => kind.default_value(),
    }
}

fn number(inputs: &Inputs<Value>, slot: &str) -> f64 {
    inputs.get(slot).map_or(0.0, Value::as_number)
}

fn truthy(inputs: &Inputs<Value>, slot: &str) -> bool {
    inputs.get(slot).is_some_and(Value::is_truthy)
}

fn text(inputs: &Inputs<Value>, slot: &str) -> String {
    inputs.get(slot).map(Value::to_text).unwrap_or_default()
}

fn compare(op: ComparisonOp, left: &Value, right: &Value) -> bool {
    match op {
        ComparisonOp::Equal => left.loosely_equals(right),
        ComparisonOp::NotEqual => !left.loosely_equals(right),
        ComparisonOp::Less => left.compare(right) == Some(Ordering::Less),
        ComparisonOp::Greater => left.compare(right) == Some(Ordering::Greater),
        ComparisonOp::LessOrEqual => {
            matches!(left.compare(right), Some(Ordering::Less | Ordering::Equal))
        }
        ComparisonOp::GreaterOrEqual => {
            matches!(left.compare(right), Some(Ordering::Greater | Ordering::Equal))
        }
    }
}

/// Resolves Python slice bounds `[start:end]` against a sequence length.
pub(crate) fn slice_bounds(len: usize, start: Option<i64>, end: Option<i64>) -> (usize, usize) {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let clamp = |i: i64| if i < 0 { (i + len).max(0) } else { i.min(len) };
    let from = start.map_or(0, clamp);
    let to = end.map_or(len, clamp).max(from);
    (from as usize, to as usize)
}

fn string_operation(cfg: &StringConfig, inputs: &Inputs<Value>) -> Value {
    let left = text(inputs, "left");
    match cfg.op {
        StringOp::Concat => Value::Text(left + &text(inputs, "right")),
        StringOp::Length => Value::Number(left.chars().count() as f64),
        StringOp::Substring => {
            let chars: Vec<char> = left.chars().collect();
            let (from, to) = slice_bounds(chars.len(), Some(cfg.start), cfg.effective_end());
            Value::Text(chars[from..to].iter().collect())
        }
        StringOp::Uppercase => Value::Text(left.to_uppercase()),
        StringOp::Lowercase => Value::Text(left.to_lowercase()),
        StringOp::Replace => Value::Text(left.replacen(&cfg.search, &cfg.replace, 1)),
        StringOp::Split => {
            let parts: Vec<Value> = if cfg.delimiter.is_empty() {
                left.chars().map(|c| Value::Text(c.to_string())).collect()
            } else {
                left.split(cfg.delimiter.as_str())
                    .map(|part| Value::Text(part.to_string()))
                    .collect()
            };
            Value::List(parts)
        }
        StringOp::Join => match inputs.get("left") {
            Some(Value::List(items)) => Value::Text(join_items(items, &cfg.delimiter)),
            // Text holding a JSON array is joined too; any other text passes through.
            _ => match serde_json::from_str::<Vec<Value>>(&left) {
                Ok(items) => Value::Text(join_items(&items, &cfg.delimiter)),
                Err(_) => Value::Text(left),
            },
        },
        StringOp::Trim => Value::Text(left.trim().to_string()),
        StringOp::Contains => Value::Bool(left.contains(cfg.search.as_str())),
    }
}

fn join_items(items: &[Value], delimiter: &str) -> String {
    itertools::join(items.iter().map(Value::to_text), delimiter)
}

fn list_operation(cfg: &ListConfig, inputs: &Inputs<Value>) -> Value {
    let mut items = match inputs.get("target") {
        Some(Value::List(items)) => items.clone(),
        Some(Value::Text(text)) => Value::parse_list(text),
        Some(other) => other.to_list(),
        None => Vec::new(),
    };

    match cfg.op {
        ListOp::Push => {
            items.push(cfg.push_literal());
            Value::List(items)
        }
        ListOp::Pop => {
            items.pop();
            Value::List(items)
        }
        ListOp::Map => Value::List(map_items(&cfg.map_expression, items)),
        ListOp::Filter => Value::List(filter_items(&cfg.filter_expression, items)),
        ListOp::Length => Value::Number(items.len() as f64),
        ListOp::Join => Value::Text(join_items(&items, &cfg.delimiter)),
        ListOp::Slice => {
            let (start, end) = cfg.slice_bounds();
            let (from, to) = slice_bounds(items.len(), start, end);
            Value::List(items.drain(from..to).collect())
        }
        ListOp::Reverse => {
            items.reverse();
            Value::List(items)
        }
        ListOp::Sort => {
            items.sort_by(Value::sort_cmp);
            Value::List(items)
        }
    }
}

// A failing expression leaves the element unchanged.
fn map_items(source: &str, items: Vec<Value>) -> Vec<Value> {
    let expression = match parse_expression(source) {
        Ok(expression) => expression,
        Err(err) => {
            debug!(expression = source, error = %err, "map expression rejected; passing elements through");
            return items;
        }
    };
    items
        .into_iter()
        .map(|item| {
            let result = Sandbox::new(&expression, &item).evaluate();
            match result {
                Ok(mapped) => mapped,
                Err(err) => {
                    debug!(element = %item, error = %err, "map expression failed on element");
                    item
                }
            }
        })
        .collect()
}

// A failing condition keeps the element.
fn filter_items(source: &str, items: Vec<Value>) -> Vec<Value> {
    let expression = match parse_expression(source) {
        Ok(expression) => expression,
        Err(err) => {
            debug!(expression = source, error = %err, "filter expression rejected; keeping elements");
            return items;
        }
    };
    items
        .into_iter()
        .filter(|item| {
            Sandbox::new(&expression, item)
                .evaluate()
                .map_or(true, |keep| keep.is_truthy())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::Slots;

    fn bind(kind: &NodeKind, edges: Vec<(Option<&str>, Value)>) -> Inputs<Value> {
        Inputs::bind(kind.input_slots(), edges)
    }

    fn run(kind: NodeKind, edges: Vec<(Option<&str>, Value)>) -> Value {
        let inputs = bind(&kind, edges);
        evaluate(&kind, &Value::default(), &inputs)
    }

    fn list(values: &[f64]) -> Value {
        Value::List(values.iter().map(|n| Value::Number(*n)).collect())
    }

    #[test]
    fn python_slice_semantics() {
        assert_eq!(slice_bounds(5, Some(1), Some(3)), (1, 3));
        assert_eq!(slice_bounds(5, Some(-2), None), (3, 5));
        assert_eq!(slice_bounds(5, Some(4), Some(2)), (4, 4));
        assert_eq!(slice_bounds(3, Some(10), None), (3, 3));
    }

    #[test]
    fn arithmetic_defaults_missing_inputs_to_zero() {
        assert_eq!(run(NodeKind::Subtraction, vec![(Some("b"), 4.0.into())]), Value::Number(-4.0));
        assert_eq!(run(NodeKind::Division, vec![(None, 4.0.into())]), Value::Number(0.0));
        assert_eq!(run(NodeKind::Multiplication, vec![]), Value::Number(0.0));
        assert_eq!(
            run(NodeKind::Multiplication, vec![(None, 2.0.into()), (None, 3.0.into()), (None, 4.0.into())]),
            Value::Number(24.0)
        );
    }

    #[test]
    fn boolean_truth_table() {
        let cases = [
            (BooleanOp::And, [false, false, false, true]),
            (BooleanOp::Or, [false, true, true, true]),
            (BooleanOp::Xor, [false, true, true, false]),
            (BooleanOp::Nand, [true, true, true, false]),
            (BooleanOp::Nor, [true, false, false, false]),
        ];
        for (op, expected) in cases {
            for (i, (a, b)) in [(false, false), (false, true), (true, false), (true, true)]
                .into_iter()
                .enumerate()
            {
                let result = run(
                    NodeKind::BooleanOperation(op),
                    vec![(Some("left"), a.into()), (Some("right"), b.into())],
                );
                assert_eq!(result, Value::Bool(expected[i]), "{} {} {}", a, op, b);
            }
        }
        let not = run(NodeKind::BooleanOperation(BooleanOp::Not), vec![(None, true.into())]);
        assert_eq!(not, Value::Bool(false));
    }

    #[test]
    fn string_operations() {
        let hello = || vec![(Some("left"), Value::from("Hello, World"))];
        let op = |cfg: StringConfig| NodeKind::StringOperation(cfg);

        assert_eq!(run(op(StringConfig::new(StringOp::Length)), hello()), Value::Number(12.0));
        assert_eq!(
            run(op(StringConfig::new(StringOp::Substring).with_range(7, Some(0))), hello()),
            Value::from("World")
        );
        assert_eq!(
            run(op(StringConfig::new(StringOp::Replace).with_search("o", "0")), hello()),
            Value::from("Hell0, World")
        );
        assert_eq!(
            run(op(StringConfig::new(StringOp::Split).with_delimiter(", ")), hello()),
            Value::List(vec!["Hello".into(), "World".into()])
        );
        assert_eq!(
            run(op(StringConfig::new(StringOp::Contains).with_search("World", "")), hello()),
            Value::Bool(true)
        );
        assert_eq!(
            run(
                op(StringConfig::new(StringOp::Join).with_delimiter("-")),
                vec![(None, list(&[1.0, 2.0]))]
            ),
            Value::from("1-2")
        );
    }

    #[test]
    fn list_operations() {
        let target = || vec![(Some("target"), list(&[3.0, -1.0, 2.0]))];
        let op = |cfg: ListConfig| NodeKind::ListOperation(cfg);

        assert_eq!(
            run(op(ListConfig::new(ListOp::Push).with_push_value("7")), target()),
            list(&[3.0, -1.0, 2.0, 7.0])
        );
        assert_eq!(run(op(ListConfig::new(ListOp::Pop)), target()), list(&[3.0, -1.0]));
        assert_eq!(run(op(ListConfig::new(ListOp::Map)), target()), list(&[6.0, -2.0, 4.0]));
        assert_eq!(run(op(ListConfig::new(ListOp::Filter)), target()), list(&[3.0, 2.0]));
        assert_eq!(run(op(ListConfig::new(ListOp::Length)), target()), Value::Number(3.0));
        assert_eq!(run(op(ListConfig::new(ListOp::Join)), target()), Value::from("3,-1,2"));
        assert_eq!(
            run(op(ListConfig::new(ListOp::Slice).with_slice("1, 3")), target()),
            list(&[-1.0, 2.0])
        );
        assert_eq!(run(op(ListConfig::new(ListOp::Reverse)), target()), list(&[2.0, -1.0, 3.0]));
        assert_eq!(run(op(ListConfig::new(ListOp::Sort)), target()), list(&[-1.0, 2.0, 3.0]));
    }

    #[test]
    fn failing_expressions_pass_elements_through() {
        let items = vec![(None, Value::List(vec![Value::Number(1.0), Value::from("a")]))];
        let map = NodeKind::ListOperation(ListConfig::new(ListOp::Map).with_map("x * 10"));
        assert_eq!(
            run(map, items.clone()),
            Value::List(vec![Value::Number(10.0), Value::from("a")])
        );

        let broken = NodeKind::ListOperation(ListConfig::new(ListOp::Filter).with_filter("x >"));
        assert_eq!(run(broken, items.clone()), items[0].1);
    }

    #[test]
    fn pathological_expressions_pass_elements_through() {
        let items = vec![(None, list(&[1.0, 2.0]))];
        for depth in [1_000, 200_000] {
            let nested = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
            let map = NodeKind::ListOperation(ListConfig::new(ListOp::Map).with_map(nested.as_str()));
            assert_eq!(run(map, items.clone()), list(&[1.0, 2.0]));
        }

        let negations = format!("{}x > 0", "not ".repeat(5_000));
        let filter =
            NodeKind::ListOperation(ListConfig::new(ListOp::Filter).with_filter(negations.as_str()));
        assert_eq!(run(filter, items.clone()), list(&[1.0, 2.0]));
    }

    #[test]
    fn if_else_picks_a_branch() {
        let edges = vec![
            (Some("condition"), Value::Bool(false)),
            (Some("true"), Value::from("yes")),
            (Some("false"), Value::from("no")),
        ];
        assert_eq!(run(NodeKind::IfElse, edges), Value::from("no"));
        assert_eq!(
            run(NodeKind::IfElse, vec![(Some("condition"), Value::Bool(true))]),
            Value::Number(0.0)
        );
    }

    #[test]
    fn input_kinds_ignore_edges() {
        let inputs = Inputs::bind(Slots::None, vec![(None, Value::Number(1.0))]);
        let value = evaluate(&NodeKind::NumberInput, &Value::Number(5.0), &inputs);
        assert_eq!(value, Value::Number(5.0));
    }
}
