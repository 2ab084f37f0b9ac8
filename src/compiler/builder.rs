use super::Compiler;
use crate::graph::Graph;

pub const DEFAULT_INDENT: &str = "    ";
pub const DEFAULT_FUNCTION_NAME: &str = "calculate";

/// Output options of a [`Compiler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    pub indent: String,
    pub function_name: String,
    /// Emit the `# Generated Python code` header line.
    pub header: bool,
    /// Emit the `if __name__ == "__main__":` block that runs the function.
    pub main_block: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT.to_string(),
            function_name: DEFAULT_FUNCTION_NAME.to_string(),
            header: true,
            main_block: true,
        }
    }
}

/// Configures a [`Compiler`] before use.
pub struct CompilerBuilder<'g> {
    graph: &'g Graph,
    options: CompilerOptions,
}

impl<'g> CompilerBuilder<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            options: CompilerOptions::default(),
        }
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.options.indent = indent.into();
        self
    }

    /// Names the generated function. Invalid identifiers are ignored.
    pub fn with_function_name(mut self, name: &str) -> Self {
        let valid = name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            self.options.function_name = name.to_string();
        }
        self
    }

    pub fn with_header(mut self, enabled: bool) -> Self {
        self.options.header = enabled;
        self
    }

    pub fn with_main_block(mut self, enabled: bool) -> Self {
        self.options.main_block = enabled;
        self
    }

    pub fn build(self) -> Compiler<'g> {
        Compiler {
            graph: self.graph,
            options: self.options,
        }
    }
}
