use crate::graph::Node;
use ahash::AHashSet;

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

// Builtins the generated code calls, and the comprehension variables it binds.
const RESERVED_NAMES: &[&str] = &[
    "bool", "float", "len", "list", "print", "reversed", "sorted", "str", "v", "x",
];

/// Hands out single-assignment variable names for one compilation.
///
/// The counter spans the whole compilation and every assignment advances
/// it, so names depend only on the order nodes are emitted in.
pub(super) struct VariableNamer {
    counter: usize,
    taken: AHashSet<String>,
}

impl VariableNamer {
    pub(super) fn new(function_name: &str) -> Self {
        let mut taken = AHashSet::new();
        taken.insert(function_name.to_string());
        Self { counter: 0, taken }
    }

    pub(super) fn assign(&mut self, node: &Node) -> String {
        self.counter += 1;
        let candidate = node
            .name
            .as_deref()
            .map(sanitize)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("{}_{}", node.kind.variable_prefix(), self.counter));

        let mut name = candidate.clone();
        let mut suffix = self.counter;
        while self.is_unavailable(&name) {
            name = format!("{}_{}", candidate, suffix);
            suffix += 1;
        }
        self.taken.insert(name.clone());
        name
    }

    fn is_unavailable(&self, name: &str) -> bool {
        self.taken.contains(name)
            || PYTHON_KEYWORDS.contains(&name)
            || RESERVED_NAMES.contains(&name)
    }
}

/// Lower-cases a display name and turns it into a Python identifier.
fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let out = out.trim_matches('_').to_string();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", out)
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::NodeKind;

    #[test]
    fn display_names_are_sanitized() {
        assert_eq!(sanitize("Total Price"), "total_price");
        assert_eq!(sanitize("  3rd-value! "), "_3rd_value");
        assert_eq!(sanitize("%%%"), "");
    }

    #[test]
    fn names_are_never_reused() {
        let mut namer = VariableNamer::new("calculate");
        let named = |name: &str| Node::new("n", NodeKind::NumberInput).with_name(name);
        assert_eq!(namer.assign(&named("total")), "total");
        assert_eq!(namer.assign(&named("Total")), "total_2");
        assert_eq!(namer.assign(&named("if")), "if_3");
        assert_eq!(namer.assign(&Node::new("m", NodeKind::Division)), "quotient_4");
        assert_eq!(namer.assign(&named("calculate")), "calculate_5");
    }
}
