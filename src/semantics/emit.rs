use super::{BooleanOp, Inputs, ListConfig, ListOp, NodeKind, StringConfig, StringOp};
use crate::ast::value::python_string;
use crate::compiler::Diagnostic;
use crate::graph::Node;
use itertools::Itertools;

/// Name of the helper the generated program defines when a value that may
/// be a Python float is turned into text.
pub const TEXT_HELPER: &str = "_text";

/// Source of the text helper. Integral floats render without `.0`, the way
/// live values render.
pub fn text_helper_source(indent: &str) -> Vec<String> {
    vec![
        format!("def {}(value):", TEXT_HELPER),
        format!(
            "{}if isinstance(value, float) and value.is_integer() and abs(value) < 1e16:",
            indent
        ),
        format!("{0}{0}return str(int(value))", indent),
        format!("{}if isinstance(value, list):", indent),
        format!(
            "{0}{0}return \"[\" + \", \".join(repr(v) if isinstance(v, str) else {1}(v) for v in value) + \"]\"",
            indent, TEXT_HELPER
        ),
        format!("{}return str(value)", indent),
    ]
}

/// An upstream variable as the emitter sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    pub var: String,
    /// The variable may hold a Python float.
    pub float: bool,
}

impl Operand {
    pub fn new(var: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            float: false,
        }
    }

    pub fn float(var: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            float: true,
        }
    }
}

/// Python statements generated for one node, plus what was substituted or
/// guarded along the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Emission {
    pub statements: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// The assigned variable may hold a Python float.
    pub float: bool,
    /// The statements call [`TEXT_HELPER`].
    pub uses_text_helper: bool,
}

/// Generates the statements computing `node` into `var`.
///
/// `inputs` holds the upstream variables. Display nodes print their input
/// and ignore `var`; unknown kinds produce a comment placeholder only.
pub fn emit(node: &Node, var: &str, inputs: &Inputs<Operand>) -> Emission {
    let mut emitter = Emitter {
        node,
        inputs,
        emission: Emission::default(),
    };
    if inputs.unbound() > 0 && !matches!(node.kind, NodeKind::Unknown(_)) {
        emitter.note(Diagnostic::SurplusInputs {
            node_id: node.id.clone(),
            count: inputs.unbound(),
        });
    }
    let statement = emitter.statement(var);
    let float = statement.is_some() && emitter.result_is_float();
    let mut emission = emitter.emission;
    emission.statements.extend(statement);
    emission.float = float;
    emission
}

struct Emitter<'a> {
    node: &'a Node,
    inputs: &'a Inputs<Operand>,
    emission: Emission,
}

impl Emitter<'_> {
    /// Records a diagnostic and writes it into the program as a comment.
    fn note(&mut self, diagnostic: Diagnostic) {
        self.emission.statements.push(format!("# {}", diagnostic));
        self.emission.diagnostics.push(diagnostic);
    }

    /// The variable bound to `slot`, or `default` with a note when unbound.
    fn operand(&mut self, slot: &'static str, default: &str) -> String {
        if let Some(operand) = self.inputs.get(slot) {
            return operand.var.clone();
        }
        self.note(Diagnostic::MissingInput {
            node_id: self.node.id.clone(),
            slot,
            substituted: default.to_string(),
        });
        default.to_string()
    }

    fn is_float(&self, slot: &str) -> bool {
        self.inputs.get(slot).is_some_and(|operand| operand.float)
    }

    /// Python text conversion of `expr`.
    fn to_text(&mut self, expr: &str, float: bool) -> String {
        if float {
            self.emission.uses_text_helper = true;
            format!("{}({})", TEXT_HELPER, expr)
        } else {
            format!("str({})", expr)
        }
    }

    /// Whether the value this node assigns may be a Python float.
    fn result_is_float(&self) -> bool {
        let node = self.node;
        match &node.kind {
            NodeKind::NumberInput | NodeKind::ListInput => node.value.has_float_literal(),
            NodeKind::Division => true,
            NodeKind::Addition | NodeKind::Multiplication => {
                self.inputs.variadic().iter().any(|operand| operand.float)
            }
            NodeKind::Subtraction => self.is_float("a") || self.is_float("b"),
            NodeKind::IfElse => self.is_float("true") || self.is_float("false"),
            NodeKind::ListOperation(cfg) => match cfg.op {
                ListOp::Length | ListOp::Join => false,
                ListOp::Push => self.is_float("target") || cfg.push_literal().has_float_literal(),
                ListOp::Map => {
                    let expr = &cfg.map_expression;
                    self.is_float("target") || expr.contains('/') || expr.contains('.')
                }
                _ => self.is_float("target"),
            },
            NodeKind::StringInput
            | NodeKind::BooleanInput
            | NodeKind::Comparison(_)
            | NodeKind::BooleanOperation(_)
            | NodeKind::StringOperation(_)
            | NodeKind::Display
            | NodeKind::Unknown(_) => false,
        }
    }

    fn statement(&mut self, var: &str) -> Option<String> {
        let node = self.node;
        let expr = match &node.kind {
            NodeKind::NumberInput
            | NodeKind::StringInput
            | NodeKind::BooleanInput
            | NodeKind::ListInput => node.value.python_literal(),

            NodeKind::Addition => self.fold(" + "),
            NodeKind::Multiplication => self.fold(" * "),
            NodeKind::Subtraction => {
                let a = self.operand("a", "0");
                let b = self.operand("b", "0");
                format!("{} - {}", a, b)
            }
            NodeKind::Division => {
                let a = self.operand("a", "0");
                let b = self.operand("b", "0");
                let guard = Diagnostic::DivisionGuard {
                    node_id: self.node.id.clone(),
                };
                let expr = format!("{} / {} if {} != 0 else 0  # {}", a, b, b, guard);
                self.emission.diagnostics.push(guard);
                expr
            }

            NodeKind::Comparison(op) => {
                let left = self.operand("left", "0");
                let right = self.operand("right", "0");
                format!("{} {} {}", left, op, right)
            }

            NodeKind::BooleanOperation(op) => {
                let l = format!("bool({})", self.operand("left", "False"));
                let r = if op.is_unary() {
                    String::new()
                } else {
                    format!("bool({})", self.operand("right", "False"))
                };
                match op {
                    BooleanOp::Not => format!("not {}", l),
                    BooleanOp::And => format!("{} and {}", l, r),
                    BooleanOp::Or => format!("{} or {}", l, r),
                    BooleanOp::Xor => format!("{} != {}", l, r),
                    BooleanOp::Nand => format!("not ({} and {})", l, r),
                    BooleanOp::Nor => format!("not ({} or {})", l, r),
                }
            }

            NodeKind::StringOperation(cfg) => self.string_operation(cfg),
            NodeKind::ListOperation(cfg) => self.list_operation(cfg),

            NodeKind::IfElse => {
                let condition = self.operand("condition", "False");
                let when_true = self.operand("true", "0");
                let when_false = self.operand("false", "0");
                format!("{} if {} else {}", when_true, condition, when_false)
            }

            NodeKind::Display => {
                let float = self.is_float("input");
                let input = self.operand("input", "\"\"");
                let shown = if float {
                    self.to_text(&input, true)
                } else {
                    input
                };
                return Some(format!("print({})", shown));
            }

            NodeKind::Unknown(type_name) => {
                self.note(Diagnostic::UnknownKind {
                    node_id: self.node.id.clone(),
                    type_name: type_name.clone(),
                });
                return None;
            }
        };
        Some(format!("{} = {}", var, expr))
    }

    fn fold(&self, operator: &str) -> String {
        match self.inputs.variadic() {
            [] => "0".to_string(),
            operands => operands.iter().map(|operand| &operand.var).join(operator),
        }
    }

    fn string_operation(&mut self, cfg: &StringConfig) -> String {
        let left_float = self.is_float("left");
        let left = self.operand("left", "\"\"");
        match cfg.op {
            StringOp::Concat => {
                let right_float = self.is_float("right");
                let right = self.operand("right", "\"\"");
                let left = self.to_text(&left, left_float);
                let right = self.to_text(&right, right_float);
                format!("{} + {}", left, right)
            }
            StringOp::Length => format!("len({})", left),
            StringOp::Substring => match cfg.effective_end() {
                Some(end) => format!("{}[{}:{}]", left, cfg.start, end),
                None => format!("{}[{}:]", left, cfg.start),
            },
            StringOp::Uppercase => format!("{}.upper()", left),
            StringOp::Lowercase => format!("{}.lower()", left),
            StringOp::Replace => format!(
                "{}.replace({}, {}, 1)",
                left,
                python_string(&cfg.search),
                python_string(&cfg.replace)
            ),
            StringOp::Split if cfg.delimiter.is_empty() => format!("list({})", left),
            StringOp::Split => format!("{}.split({})", left, python_string(&cfg.delimiter)),
            StringOp::Join => {
                let item = self.to_text("v", left_float);
                format!("{}.join({} for v in {})", python_string(&cfg.delimiter), item, left)
            }
            StringOp::Trim => format!("{}.strip()", left),
            StringOp::Contains => format!("{} in {}", python_string(&cfg.search), left),
        }
    }

    fn list_operation(&mut self, cfg: &ListConfig) -> String {
        let target_float = self.is_float("target");
        let target = self.operand("target", "[]");
        match cfg.op {
            ListOp::Push => format!("{} + [{}]", target, cfg.push_literal().python_literal()),
            ListOp::Pop => format!("{}[:-1]", target),
            // User expressions are copied verbatim; the element is bound to `x`.
            ListOp::Map => match cfg.map_expression.trim() {
                "" => format!("list({})", target),
                expr => format!("[{} for x in {}]", expr, target),
            },
            ListOp::Filter => match cfg.filter_expression.trim() {
                "" => format!("list({})", target),
                expr => format!("[x for x in {} if {}]", target, expr),
            },
            ListOp::Length => format!("len({})", target),
            ListOp::Join => {
                let item = self.to_text("v", target_float);
                format!("{}.join({} for v in {})", python_string(&cfg.delimiter), item, target)
            }
            ListOp::Slice => {
                let (start, end) = cfg.slice_bounds();
                let bound = |b: Option<i64>| b.map(|n| n.to_string()).unwrap_or_default();
                format!("{}[{}:{}]", target, bound(start), bound(end))
            }
            ListOp::Reverse => format!("list(reversed({}))", target),
            ListOp::Sort => format!("sorted({})", target),
        }
    }
}
