use super::{Expression, MAX_NESTING, Value};
use crate::error::ExpressionError;
use std::cmp::Ordering;

// This macro generates a match arm for a binary operation.
macro_rules! eval_op {
    ($self:ident, $l:ident, $r:ident, $depth:ident, $op_str:expr, $op_fn:expr, number) => {
        $self.eval_arithmetic($l, $r, $depth, $op_str, $op_fn)
    };
    ($self:ident, $l:ident, $r:ident, $depth:ident, $op_str:expr, $op_fn:expr, ordering) => {
        $self.eval_comparison($l, $r, $depth, $op_str, $op_fn)
    };
}

/// Evaluates a MAP/FILTER expression against a single list element.
///
/// The sandbox holds nothing but the parsed expression and the element, so a
/// user-written expression cannot read or change any other graph state.
pub struct Sandbox<'a> {
    expression: &'a Expression,
    element: &'a Value,
}

impl<'a> Sandbox<'a> {
    pub fn new(expression: &'a Expression, element: &'a Value) -> Self {
        Self {
            expression,
            element,
        }
    }

    pub fn evaluate(&self) -> Result<Value, ExpressionError> {
        self.evaluate_recursive(self.expression, 0)
    }

    fn evaluate_recursive(&self, expr: &Expression, depth: usize) -> Result<Value, ExpressionError> {
        if depth > MAX_NESTING {
            return Err(ExpressionError::NestingTooDeep { limit: MAX_NESTING });
        }
        let depth = depth + 1;
        match expr {
            // --- Arithmetic Operations ---
            Expression::Sum(l, r) => {
                let left = self.evaluate_recursive(l, depth)?;
                let right = self.evaluate_recursive(r, depth)?;
                match (left, right) {
                    (Value::Text(a), Value::Text(b)) => Ok(Value::Text(a + &b)),
                    (Value::List(mut a), Value::List(b)) => {
                        a.extend(b);
                        Ok(Value::List(a))
                    }
                    (a, b) => Ok(Value::Number(numeric("+", &a)? + numeric("+", &b)?)),
                }
            }
            Expression::Subtract(l, r) => eval_op!(self, l, r, depth, "-", |a, b| Ok(a - b), number),
            Expression::Multiply(l, r) => eval_op!(self, l, r, depth, "*", |a, b| Ok(a * b), number),
            Expression::Divide(l, r) => eval_op!(
                self,
                l,
                r,
                depth,
                "/",
                |a, b| if b == 0.0 {
                    Err(ExpressionError::DivisionByZero)
                } else {
                    Ok(a / b)
                },
                number
            ),
            // Python's modulo takes the sign of the divisor.
            Expression::Modulo(l, r) => eval_op!(
                self,
                l,
                r,
                depth,
                "%",
                |a, b| if b == 0.0 {
                    Err(ExpressionError::DivisionByZero)
                } else {
                    Ok(a - b * (a / b).floor())
                },
                number
            ),
            Expression::Negate(v) => {
                let value = self.evaluate_recursive(v, depth)?;
                Ok(Value::Number(-numeric("-", &value)?))
            }

            // --- Comparison Operations ---
            Expression::GreaterThan(l, r) => {
                eval_op!(self, l, r, depth, ">", |o| o == Ordering::Greater, ordering)
            }
            Expression::GreaterThanOrEqual(l, r) => {
                eval_op!(self, l, r, depth, ">=", |o| o != Ordering::Less, ordering)
            }
            Expression::SmallerThan(l, r) => {
                eval_op!(self, l, r, depth, "<", |o| o == Ordering::Less, ordering)
            }
            Expression::SmallerThanOrEqual(l, r) => {
                eval_op!(self, l, r, depth, "<=", |o| o != Ordering::Greater, ordering)
            }

            // --- Equality ---
            Expression::Equal(l, r) => {
                let left = self.evaluate_recursive(l, depth)?;
                let right = self.evaluate_recursive(r, depth)?;
                Ok(Value::Bool(left.loosely_equals(&right)))
            }
            Expression::NotEqual(l, r) => {
                let left = self.evaluate_recursive(l, depth)?;
                let right = self.evaluate_recursive(r, depth)?;
                Ok(Value::Bool(!left.loosely_equals(&right)))
            }

            // --- Logical Operations ---
            // `and`/`or` short-circuit and yield an operand, as in Python.
            Expression::And(l, r) => {
                let left = self.evaluate_recursive(l, depth)?;
                if !left.is_truthy() {
                    return Ok(left);
                }
                self.evaluate_recursive(r, depth)
            }
            Expression::Or(l, r) => {
                let left = self.evaluate_recursive(l, depth)?;
                if left.is_truthy() {
                    return Ok(left);
                }
                self.evaluate_recursive(r, depth)
            }
            Expression::Not(v) => Ok(Value::Bool(!self.evaluate_recursive(v, depth)?.is_truthy())),

            // --- Leaf nodes ---
            Expression::Literal(val) => Ok(val.clone()),
            Expression::Element => Ok(self.element.clone()),
        }
    }

    fn eval_arithmetic<F>(
        &self,
        l: &Expression,
        r: &Expression,
        depth: usize,
        op: &'static str,
        f: F,
    ) -> Result<Value, ExpressionError>
    where
        F: Fn(f64, f64) -> Result<f64, ExpressionError>,
    {
        let left = self.evaluate_recursive(l, depth)?;
        let right = self.evaluate_recursive(r, depth)?;
        f(numeric(op, &left)?, numeric(op, &right)?).map(Value::Number)
    }

    fn eval_comparison<F>(
        &self,
        l: &Expression,
        r: &Expression,
        depth: usize,
        op: &'static str,
        f: F,
    ) -> Result<Value, ExpressionError>
    where
        F: Fn(Ordering) -> bool,
    {
        let left = self.evaluate_recursive(l, depth)?;
        let right = self.evaluate_recursive(r, depth)?;
        match left.compare(&right) {
            Some(ordering) => Ok(Value::Bool(f(ordering))),
            None => Err(ExpressionError::TypeMismatch {
                operation: op.to_string(),
                expected: left.value_type().name().to_string(),
                found: right,
            }),
        }
    }
}

fn numeric(op: &str, value: &Value) -> Result<f64, ExpressionError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Bool(b) => Ok(f64::from(u8::from(*b))),
        other => Err(ExpressionError::TypeMismatch {
            operation: op.to_string(),
            expected: "number".to_string(),
            found: other.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse_expression;

    fn run(source: &str, element: Value) -> Result<Value, ExpressionError> {
        let expr = parse_expression(source)?;
        Sandbox::new(&expr, &element).evaluate()
    }

    #[test]
    fn arithmetic_on_numbers() {
        assert_eq!(run("x * 2 + 1", Value::Number(3.0)).unwrap(), Value::Number(7.0));
        assert_eq!(run("-x % 3", Value::Number(1.0)).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn text_concatenation() {
        assert_eq!(
            run("x + '!'", Value::Text("hi".into())).unwrap(),
            Value::Text("hi!".into())
        );
    }

    #[test]
    fn failures_are_reported_not_panicked() {
        assert!(matches!(
            run("x / 0", Value::Number(1.0)),
            Err(ExpressionError::DivisionByZero)
        ));
        assert!(matches!(
            run("x * 2", Value::Text("a".into())),
            Err(ExpressionError::TypeMismatch { .. })
        ));
        assert!(matches!(
            run("x > 'a'", Value::Number(1.0)),
            Err(ExpressionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn deep_trees_fail_instead_of_recursing() {
        let mut expr = Expression::Element;
        for _ in 0..MAX_NESTING + 10 {
            expr = Expression::Negate(Box::new(expr));
        }
        let element = Value::Number(1.0);
        assert_eq!(
            Sandbox::new(&expr, &element).evaluate(),
            Err(ExpressionError::NestingTooDeep { limit: MAX_NESTING })
        );
    }

    #[test]
    fn logical_operators_short_circuit() {
        // The right side would divide by zero if it were evaluated.
        assert_eq!(
            run("x == 0 or 1 / x > 0", Value::Number(0.0)).unwrap(),
            Value::Bool(true)
        );
    }
}
