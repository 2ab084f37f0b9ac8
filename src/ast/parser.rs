use super::{Expression, Value};
use crate::error::ExpressionError;
use chumsky::input::{Input, Stream, ValueInput};
use chumsky::{pratt::*, prelude::*};
use std::fmt;

/// Name of the single variable a MAP/FILTER expression may reference.
pub const ELEMENT_NAME: &str = "x";

/// Deepest nesting a MAP/FILTER expression may reach. Operators and open
/// parentheses both count, so the syntax tree is never deeper than this.
pub const MAX_NESTING: usize = 64;

type Span = SimpleSpan;
type LexError<'src> = extra::Err<Rich<'src, char, Span>>;
type ParseError<'src> = extra::Err<Rich<'src, Token, Span>>;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    /// A string literal missing its closing quote.
    Unterminated,
    Ident(String),
    Element,
    True,
    False,
    And,
    Or,
    Not,
    Bang,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    ParenOpen,
    ParenClose,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", Value::Number(*n)),
            Token::Str(s) => write!(f, "'{}'", s),
            Token::Unterminated => write!(f, "<unterminated string>"),
            Token::Ident(name) => write!(f, "{}", name),
            Token::Element => write!(f, "{}", ELEMENT_NAME),
            Token::True => write!(f, "True"),
            Token::False => write!(f, "False"),
            Token::And => write!(f, "and"),
            Token::Or => write!(f, "or"),
            Token::Not => write!(f, "not"),
            Token::Bang => write!(f, "!"),
            Token::Equal => write!(f, "=="),
            Token::NotEqual => write!(f, "!="),
            Token::Less => write!(f, "<"),
            Token::LessOrEqual => write!(f, "<="),
            Token::Greater => write!(f, ">"),
            Token::GreaterOrEqual => write!(f, ">="),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::ParenOpen => write!(f, "("),
            Token::ParenClose => write!(f, ")"),
        }
    }
}

fn quoted<'src>(quote: char) -> impl Parser<'src, &'src str, Token, LexError<'src>> + Clone {
    let escape = just('\\').ignore_then(choice((
        just('n').to('\n'),
        just('t').to('\t'),
        any(),
    )));

    just(quote)
        .ignore_then(
            none_of([quote, '\\'])
                .or(escape)
                .repeated()
                .collect::<String>(),
        )
        .then(just(quote).or_not())
        .map(|(text, closing)| match closing {
            Some(_) => Token::Str(text),
            None => Token::Unterminated,
        })
}

fn lexer<'src>() -> impl Parser<'src, &'src str, Vec<(Token, Span)>, LexError<'src>> {
    // Longest spellings first so `===` is not read as `==` followed by `=`.
    let operator = choice((
        just("===").to(Token::Equal),
        just("!==").to(Token::NotEqual),
        just("==").to(Token::Equal),
        just("!=").to(Token::NotEqual),
        just("<=").to(Token::LessOrEqual),
        just(">=").to(Token::GreaterOrEqual),
        just("&&").to(Token::And),
        just("||").to(Token::Or),
        just('<').to(Token::Less),
        just('>').to(Token::Greater),
        just('+').to(Token::Plus),
        just('-').to(Token::Minus),
        just('*').to(Token::Star),
        just('/').to(Token::Slash),
        just('%').to(Token::Percent),
        just('!').to(Token::Bang),
        just('(').to(Token::ParenOpen),
        just(')').to(Token::ParenClose),
    ));

    let number = text::digits(10)
        .then(just('.').then(text::digits(10)).or_not())
        .ignored()
        .or(just('.').then(text::digits(10)).ignored())
        .to_slice()
        .try_map(|digits: &str, span| {
            digits
                .parse::<f64>()
                .map(Token::Number)
                .map_err(|err| Rich::custom(span, err))
        });

    let word = text::ident().map(|word: &str| match word {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "true" | "True" => Token::True,
        "false" | "False" => Token::False,
        ELEMENT_NAME => Token::Element,
        other => Token::Ident(other.to_string()),
    });

    let token = choice((number, quoted('"'), quoted('\''), word, operator));

    token
        .map_with(|token, extra| (token, extra.span()))
        .padded()
        .repeated()
        .collect()
        .padded()
}

fn parser<'src, I>() -> impl Parser<'src, I, Expression, ParseError<'src>>
where
    I: ValueInput<'src, Token = Token, Span = Span>,
{
    recursive(|expression| {
        let atom = select! {
            Token::Number(n) => Expression::Literal(Value::Number(n)),
            Token::Str(s) => Expression::Literal(Value::Text(s)),
            Token::True => Expression::Literal(Value::Bool(true)),
            Token::False => Expression::Literal(Value::Bool(false)),
            Token::Element => Expression::Element,
        };

        let nested = expression.delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

        atom.or(nested).pratt((
            // Precedence 1 (lowest): `or`, then `and`
            infix(left(1), just(Token::Or), |l, _, r, _| {
                Expression::Or(Box::new(l), Box::new(r))
            }),
            infix(left(2), just(Token::And), |l, _, r, _| {
                Expression::And(Box::new(l), Box::new(r))
            }),
            // Python's `not` binds looser than comparisons
            prefix(3, just(Token::Not), |_, inner, _| Expression::Not(Box::new(inner))),
            infix(left(4), just(Token::Equal), |l, _, r, _| {
                Expression::Equal(Box::new(l), Box::new(r))
            }),
            infix(left(4), just(Token::NotEqual), |l, _, r, _| {
                Expression::NotEqual(Box::new(l), Box::new(r))
            }),
            infix(left(4), just(Token::Less), |l, _, r, _| {
                Expression::SmallerThan(Box::new(l), Box::new(r))
            }),
            infix(left(4), just(Token::LessOrEqual), |l, _, r, _| {
                Expression::SmallerThanOrEqual(Box::new(l), Box::new(r))
            }),
            infix(left(4), just(Token::Greater), |l, _, r, _| {
                Expression::GreaterThan(Box::new(l), Box::new(r))
            }),
            infix(left(4), just(Token::GreaterOrEqual), |l, _, r, _| {
                Expression::GreaterThanOrEqual(Box::new(l), Box::new(r))
            }),
            infix(left(5), just(Token::Plus), |l, _, r, _| {
                Expression::Sum(Box::new(l), Box::new(r))
            }),
            infix(left(5), just(Token::Minus), |l, _, r, _| {
                Expression::Subtract(Box::new(l), Box::new(r))
            }),
            infix(left(6), just(Token::Star), |l, _, r, _| {
                Expression::Multiply(Box::new(l), Box::new(r))
            }),
            infix(left(6), just(Token::Slash), |l, _, r, _| {
                Expression::Divide(Box::new(l), Box::new(r))
            }),
            infix(left(6), just(Token::Percent), |l, _, r, _| {
                Expression::Modulo(Box::new(l), Box::new(r))
            }),
            prefix(7, just(Token::Minus), |_, inner, _| {
                Expression::Negate(Box::new(inner))
            }),
            prefix(7, just(Token::Bang), |_, inner, _| Expression::Not(Box::new(inner))),
            prefix(7, just(Token::Plus), |_, inner, _| inner),
        ))
    })
}

/// Parses a MAP/FILTER expression such as `x * 2` or `x > 0 && x % 2 == 0`.
///
/// Both the JavaScript spellings (`&&`, `||`, `!`, `===`) and the Python ones
/// (`and`, `or`, `not`, `True`) are accepted. Positions in errors are byte
/// offsets into `source`.
pub fn parse_expression(source: &str) -> Result<Expression, ExpressionError> {
    let (tokens, errors) = lexer()
        .then_ignore(end())
        .parse(source)
        .into_output_errors();
    if let Some(error) = errors.into_iter().next() {
        return Err(match error.found() {
            Some(found) => ExpressionError::UnexpectedCharacter {
                position: error.span().start,
                found: *found,
            },
            None => ExpressionError::UnexpectedEnd,
        });
    }
    let tokens = tokens.unwrap_or_default();
    check_tokens(&tokens)?;

    let eoi = Span::from(source.len()..source.len());
    let (expression, errors) = parser()
        .then_ignore(end())
        .parse(Stream::from_iter(tokens).map(eoi, |(token, span)| (token, span)))
        .into_output_errors();
    if let Some(error) = errors.into_iter().next() {
        return Err(match error.found() {
            Some(found) => ExpressionError::UnexpectedToken {
                position: error.span().start,
                found: found.to_string(),
            },
            None => ExpressionError::UnexpectedEnd,
        });
    }
    expression.ok_or(ExpressionError::UnexpectedEnd)
}

/// Rejects what the grammar cannot report precisely, and anything nested
/// deep enough to exhaust the stack while parsing or evaluating.
fn check_tokens(tokens: &[(Token, Span)]) -> Result<(), ExpressionError> {
    let mut open = 0usize;
    let mut operators = 0usize;
    for (token, span) in tokens {
        match token {
            Token::Unterminated => {
                return Err(ExpressionError::UnterminatedString {
                    position: span.start,
                });
            }
            Token::Ident(name) => return Err(ExpressionError::UnknownIdentifier(name.clone())),
            Token::ParenOpen => open += 1,
            Token::ParenClose => open = open.saturating_sub(1),
            Token::Number(_) | Token::Str(_) | Token::True | Token::False | Token::Element => {}
            _ => operators += 1,
        }
        if open + operators > MAX_NESTING {
            return Err(ExpressionError::NestingTooDeep { limit: MAX_NESTING });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_follows_arithmetic_rules() {
        let expr = parse_expression("x + 2 * 3").unwrap();
        assert_eq!(expr.to_string(), "x + 2 * 3");
        let grouped = parse_expression("(x + 2) * 3").unwrap();
        assert_eq!(grouped.to_string(), "(x + 2) * 3");
    }

    #[test]
    fn not_binds_looser_than_comparison() {
        let expr = parse_expression("not x == 3 and x > 0").unwrap();
        assert_eq!(expr.to_string(), "not x == 3 and x > 0");
        assert!(matches!(expr, Expression::And(..)));
    }

    #[test]
    fn javascript_and_python_spellings_agree() {
        let js = parse_expression("x > 0 && !(x === 3)").unwrap();
        let py = parse_expression("x > 0 and not (x == 3)").unwrap();
        assert_eq!(js, py);
    }

    #[test]
    fn literals() {
        assert_eq!(
            parse_expression("'a\\'b' + \"c\"").unwrap(),
            Expression::Sum(
                Box::new(Expression::Literal(Value::Text("a'b".into()))),
                Box::new(Expression::Literal(Value::Text("c".into()))),
            )
        );
        assert_eq!(
            parse_expression(".5").unwrap(),
            Expression::Literal(Value::Number(0.5))
        );
    }

    #[test]
    fn only_the_element_is_visible() {
        assert!(matches!(
            parse_expression("y * 2"),
            Err(ExpressionError::UnknownIdentifier(name)) if name == "y"
        ));
    }

    #[test]
    fn reports_trailing_garbage() {
        assert!(matches!(
            parse_expression("x 2"),
            Err(ExpressionError::UnexpectedToken { position: 2, .. })
        ));
        assert!(matches!(
            parse_expression("x *"),
            Err(ExpressionError::UnexpectedEnd)
        ));
        assert!(matches!(
            parse_expression("'open"),
            Err(ExpressionError::UnterminatedString { position: 0 })
        ));
        assert!(matches!(
            parse_expression("x # 2"),
            Err(ExpressionError::UnexpectedCharacter { position: 2, found: '#' })
        ));
    }

    #[test]
    fn deep_nesting_is_rejected_before_parsing() {
        let source = format!("{}x{}", "(".repeat(1000), ")".repeat(1000));
        assert_eq!(
            parse_expression(&source),
            Err(ExpressionError::NestingTooDeep { limit: MAX_NESTING })
        );

        let negations = format!("{}x", "-".repeat(200_000));
        assert_eq!(
            parse_expression(&negations),
            Err(ExpressionError::NestingTooDeep { limit: MAX_NESTING })
        );

        let chain = vec!["x"; 500].join(" + ");
        assert!(matches!(
            parse_expression(&chain),
            Err(ExpressionError::NestingTooDeep { .. })
        ));

        let shallow = format!("{}x{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(parse_expression(&shallow), Ok(Expression::Element));
    }
}
