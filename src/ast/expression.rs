use super::Value;
use std::fmt;

/// Syntax tree of a user-supplied MAP/FILTER expression.
///
/// The only free variable is the bound list element, so an expression can
/// never observe anything in the graph besides the value it is applied to.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // Arithmetic
    Sum(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    Modulo(Box<Expression>, Box<Expression>),
    Negate(Box<Expression>),

    // Logical
    Not(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),

    // Comparison
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    GreaterThanOrEqual(Box<Expression>, Box<Expression>),
    SmallerThan(Box<Expression>, Box<Expression>),
    SmallerThanOrEqual(Box<Expression>, Box<Expression>),

    // Leaf nodes
    Literal(Value),
    Element,
}

impl Expression {
    fn precedence(&self) -> u8 {
        match self {
            Expression::Or(..) => 1,
            Expression::And(..) => 2,
            Expression::Not(_) => 3,
            Expression::Equal(..)
            | Expression::NotEqual(..)
            | Expression::GreaterThan(..)
            | Expression::GreaterThanOrEqual(..)
            | Expression::SmallerThan(..)
            | Expression::SmallerThanOrEqual(..) => 4,
            Expression::Sum(..) | Expression::Subtract(..) => 5,
            Expression::Multiply(..) | Expression::Divide(..) | Expression::Modulo(..) => 6,
            Expression::Negate(_) => 7,
            Expression::Literal(_) | Expression::Element => 8,
        }
    }

    fn fmt_with_precedence(&self, f: &mut fmt::Formatter<'_>, parent: u8) -> fmt::Result {
        let own = self.precedence();
        let parens = own < parent;
        if parens {
            write!(f, "(")?;
        }
        match self {
            Expression::Literal(v) => write!(f, "{}", v.python_literal())?,
            Expression::Element => write!(f, "x")?,
            Expression::Negate(v) => {
                write!(f, "-")?;
                v.fmt_with_precedence(f, own)?;
            }
            Expression::Not(v) => {
                write!(f, "not ")?;
                v.fmt_with_precedence(f, own)?;
            }
            Expression::Sum(l, r) => fmt_binary(f, l, r, "+", own)?,
            Expression::Subtract(l, r) => fmt_binary(f, l, r, "-", own)?,
            Expression::Multiply(l, r) => fmt_binary(f, l, r, "*", own)?,
            Expression::Divide(l, r) => fmt_binary(f, l, r, "/", own)?,
            Expression::Modulo(l, r) => fmt_binary(f, l, r, "%", own)?,
            Expression::And(l, r) => fmt_binary(f, l, r, "and", own)?,
            Expression::Or(l, r) => fmt_binary(f, l, r, "or", own)?,
            Expression::Equal(l, r) => fmt_binary(f, l, r, "==", own)?,
            Expression::NotEqual(l, r) => fmt_binary(f, l, r, "!=", own)?,
            Expression::GreaterThan(l, r) => fmt_binary(f, l, r, ">", own)?,
            Expression::GreaterThanOrEqual(l, r) => fmt_binary(f, l, r, ">=", own)?,
            Expression::SmallerThan(l, r) => fmt_binary(f, l, r, "<", own)?,
            Expression::SmallerThanOrEqual(l, r) => fmt_binary(f, l, r, "<=", own)?,
        }
        if parens {
            write!(f, ")")?;
        }
        Ok(())
    }
}

// Binary operators are left-associative: the right operand needs parentheses
// at equal precedence, the left one does not.
fn fmt_binary(
    f: &mut fmt::Formatter<'_>,
    l: &Expression,
    r: &Expression,
    op: &str,
    own: u8,
) -> fmt::Result {
    l.fmt_with_precedence(f, own)?;
    write!(f, " {} ", op)?;
    r.fmt_with_precedence(f, own + 1)
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with_precedence(f, 0)
    }
}
