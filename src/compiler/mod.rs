//! Python code generation.
//!
//! The compiler walks the sink nodes in graph insertion order, emits each
//! sink's dependencies in resolver order, and wraps the statements in a
//! function returning the values of the non-Display sinks. A single
//! "emitted" set spans all sinks, so shared upstream nodes are emitted once.

mod builder;
mod diagnostic;
mod namer;

pub use builder::{CompilerBuilder, CompilerOptions, DEFAULT_FUNCTION_NAME, DEFAULT_INDENT};
pub use diagnostic::Diagnostic;

use crate::error::CompileError;
use crate::graph::{Graph, Node, NodeId};
use crate::resolver::Resolver;
use crate::semantics::{Inputs, NodeKind, Operand, emit, text_helper_source};
use ahash::AHashSet;
use indexmap::IndexMap;
use namer::VariableNamer;
use std::fmt;
use tracing::debug;

/// The whole source generated for an empty graph.
pub const EMPTY_GRAPH_SOURCE: &str = "# No nodes in the workspace";

const HEADER: &str = "# Generated Python code";

/// The result of compiling a graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledProgram {
    pub source: String,
    /// Variable holding each emitted node's value, in emission order. A
    /// Display node maps to the variable it prints.
    pub variables: IndexMap<NodeId, String>,
    /// Sink nodes in the order they were processed.
    pub sinks: Vec<NodeId>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompiledProgram {
    pub fn variable_of(&self, id: &str) -> Option<&str> {
        self.variables.get(id).map(String::as_str)
    }
}

impl fmt::Display for CompiledProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Compiles a graph with default options.
pub fn compile(graph: &Graph) -> Result<CompiledProgram, CompileError> {
    Compiler::new(graph).compile()
}

pub struct Compiler<'g> {
    graph: &'g Graph,
    options: CompilerOptions,
}

impl<'g> Compiler<'g> {
    pub fn builder(graph: &'g Graph) -> CompilerBuilder<'g> {
        CompilerBuilder::new(graph)
    }

    pub fn new(graph: &'g Graph) -> Self {
        CompilerBuilder::new(graph).build()
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Generates the program. Compiling the same graph twice yields
    /// byte-identical source.
    pub fn compile(&self) -> Result<CompiledProgram, CompileError> {
        if self.graph.is_empty() {
            return Ok(CompiledProgram {
                source: EMPTY_GRAPH_SOURCE.to_string(),
                ..CompiledProgram::default()
            });
        }

        let sinks: Vec<&Node> = self
            .graph
            .nodes()
            .filter(|node| {
                node.kind == NodeKind::Display || !self.graph.has_outgoing(&node.id)
            })
            .collect();
        debug!(
            nodes = self.graph.len(),
            sinks = sinks.len(),
            "compiling graph"
        );

        let resolver = Resolver::new(self.graph);
        let mut session = Session::new(self.graph, &self.options.function_name);
        for sink in &sinks {
            for id in resolver.evaluation_order(&sink.id)? {
                session.emit_node(&id);
            }
        }

        let returns: Vec<&str> = sinks
            .iter()
            .filter(|sink| sink.kind != NodeKind::Display)
            .filter_map(|sink| session.variables.get(sink.id.as_str()).map(String::as_str))
            .collect();
        let source = self.render(&session.body, &returns, session.text_helper);

        Ok(CompiledProgram {
            source,
            sinks: sinks.iter().map(|sink| sink.id.clone()).collect(),
            variables: session.variables,
            diagnostics: session.diagnostics,
        })
    }

    fn render(&self, body: &[String], returns: &[&str], text_helper: bool) -> String {
        let CompilerOptions {
            indent,
            function_name,
            header,
            main_block,
        } = &self.options;

        let mut lines: Vec<String> = Vec::with_capacity(body.len() + 8);
        if *header {
            lines.push(HEADER.to_string());
        }
        if text_helper {
            lines.extend(text_helper_source(indent));
            lines.push(String::new());
        }
        lines.push(format!("def {}():", function_name));
        lines.extend(body.iter().map(|statement| format!("{}{}", indent, statement)));

        let value = match returns {
            [] => "None".to_string(),
            [single] => single.to_string(),
            many => format!("({})", many.join(", ")),
        };
        lines.push(format!("{}return {}", indent, value));

        if *main_block {
            lines.push(String::new());
            lines.push("if __name__ == \"__main__\":".to_string());
            lines.push(format!("{}result = {}()", indent, function_name));
            lines.push(format!("{}print(f\"Result: {{result}}\")", indent));
        }
        lines.join("\n")
    }
}

/// Mutable state of one `compile` call.
struct Session<'g> {
    graph: &'g Graph,
    namer: VariableNamer,
    emitted: AHashSet<NodeId>,
    variables: IndexMap<NodeId, String>,
    /// Variables that may hold a Python float.
    floats: AHashSet<String>,
    text_helper: bool,
    body: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'g> Session<'g> {
    fn new(graph: &'g Graph, function_name: &str) -> Self {
        Self {
            graph,
            namer: VariableNamer::new(function_name),
            emitted: AHashSet::new(),
            variables: IndexMap::new(),
            floats: AHashSet::new(),
            text_helper: false,
            body: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn emit_node(&mut self, id: &NodeId) {
        if !self.emitted.insert(id.clone()) {
            return;
        }
        let Some(node) = self.graph.node(id) else {
            return;
        };

        // Every edge is bound, so slots line up with live evaluation. Upstream
        // nodes without a variable (unknown kinds, unconnected displays)
        // leave their slot missing.
        let inputs = Inputs::bind(
            node.kind.input_slots(),
            self.graph.edges_into(id).map(|edge| {
                let operand = self.variables.get(edge.source.as_str()).map(|var| Operand {
                    var: var.clone(),
                    float: self.floats.contains(var),
                });
                (edge.target_handle.as_deref(), operand)
            }),
        )
        .flatten();

        let var = match &node.kind {
            NodeKind::Display => {
                if let Some(upstream) = inputs.get("input") {
                    self.variables.insert(id.clone(), upstream.var.clone());
                }
                String::new()
            }
            NodeKind::Unknown(_) => String::new(),
            _ => {
                let var = self.namer.assign(node);
                self.variables.insert(id.clone(), var.clone());
                var
            }
        };

        let emission = emit(node, &var, &inputs);
        if emission.float {
            self.floats.insert(var);
        }
        self.text_helper |= emission.uses_text_helper;
        self.body.extend(emission.statements);
        self.diagnostics.extend(emission.diagnostics);
    }
}
