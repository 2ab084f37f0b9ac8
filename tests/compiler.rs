//! Tests for Python code generation.
mod common;
use common::*;
use kairo::compiler::EMPTY_GRAPH_SOURCE;
use kairo::prelude::*;

/// Compiles without the header and main block, so assertions can match the
/// function body alone.
fn body_of(graph: &Graph) -> String {
    Compiler::builder(graph)
        .with_header(false)
        .with_main_block(false)
        .build()
        .compile()
        .unwrap()
        .source
}

#[test]
fn test_addition_program() {
    let graph = create_addition_graph();
    let program = Compiler::new(&graph).compile().unwrap();

    let expected = [
        "# Generated Python code",
        "def calculate():",
        "    num_1 = 5",
        "    num_2 = 3",
        "    sum_3 = num_1 + num_2",
        "    print(sum_3)",
        "    return None",
        "",
        "if __name__ == \"__main__\":",
        "    result = calculate()",
        "    print(f\"Result: {result}\")",
    ]
    .join("\n");
    assert_eq!(program.source, expected);
    assert!(program.diagnostics.is_empty());
    assert_eq!(program.variable_of("out"), Some("sum_3"));
}

#[test]
fn test_division_is_guarded() {
    let graph = create_division_graph();
    let program = Compiler::new(&graph).compile().unwrap();

    assert!(program.source.contains(
        "    quotient_3 = num_1 / num_2 if num_2 != 0 else 0  # Prevent division by zero"
    ));
    assert!(program.source.contains("    print(_text(quotient_3))"));
    assert_eq!(
        program.diagnostics,
        vec![Diagnostic::DivisionGuard {
            node_id: NodeId::from("quotient")
        }]
    );
}

#[test]
fn test_if_else_program() {
    let graph = create_if_else_graph();
    let expected = [
        "def calculate():",
        "    bool_1 = True",
        "    str_2 = \"yes\"",
        "    str_3 = \"no\"",
        "    result_4 = str_2 if bool_1 else str_3",
        "    return result_4",
    ]
    .join("\n");
    assert_eq!(body_of(&graph), expected);
}

#[test]
fn test_sort_program() {
    let graph = create_sort_graph();
    let expected = [
        "def calculate():",
        "    list_1 = [3, 1, 2]",
        "    list_result_2 = sorted(list_1)",
        "    return list_result_2",
    ]
    .join("\n");
    assert_eq!(body_of(&graph), expected);
}

#[test]
fn test_empty_graph() {
    let graph = Graph::new();
    let program = Compiler::new(&graph).compile().unwrap();
    assert_eq!(program.source, EMPTY_GRAPH_SOURCE);
    assert!(program.variables.is_empty());
}

#[test]
fn test_diamond_emits_shared_node_once() {
    let graph = create_diamond_graph();
    let source = body_of(&graph);

    assert_eq!(source.matches("num_1 = 2").count(), 1);
    assert!(source.contains("    sum_2 = num_1"));
    assert!(source.contains("    product_3 = num_1"));
    assert!(source.contains("    diff_4 = sum_2 - product_3"));
    assert!(source.ends_with("    return diff_4"));
}

#[test]
fn test_shared_node_across_sinks_is_emitted_once() {
    let graph = build_graph(
        vec![
            number("x", 4.0),
            computed("first", NodeKind::Display),
            computed("second", NodeKind::Display),
        ],
        &[("x", "first", None), ("x", "second", None)],
    );
    let source = body_of(&graph);
    assert_eq!(source.matches("num_1 = 4").count(), 1);
    assert_eq!(source.matches("print(num_1)").count(), 2);
}

#[test]
fn test_multiple_sinks_return_a_tuple() {
    let graph = build_graph(vec![number("a", 1.0), number("b", 2.0)], &[]);
    let source = body_of(&graph);
    assert!(source.ends_with("    return (num_1, num_2)"));
}

#[test]
fn test_missing_input_is_substituted() {
    let graph = build_graph(
        vec![number("a", 7.0), computed("diff", NodeKind::Subtraction)],
        &[("a", "diff", Some("a"))],
    );
    let program = Compiler::new(&graph).compile().unwrap();

    assert!(
        program
            .source
            .contains("    # Missing input 'b' on node 'diff', using 0\n    diff_2 = num_1 - 0")
    );
    assert_eq!(
        program.diagnostics,
        vec![Diagnostic::MissingInput {
            node_id: NodeId::from("diff"),
            slot: "b",
            substituted: "0".to_string(),
        }]
    );
}

#[test]
fn test_unknown_kind_becomes_a_comment() {
    let graph = build_graph(
        vec![
            computed("mystery", NodeKind::Unknown("widget".to_string())),
            computed("out", NodeKind::Display),
        ],
        &[("mystery", "out", None)],
    );
    let program = Compiler::new(&graph).compile().unwrap();

    assert!(program.source.contains("    # Unknown node type: widget"));
    assert!(program.source.contains("    print(\"\")"));
    assert!(program.variable_of("mystery").is_none());
    assert_eq!(program.diagnostics.len(), 2);
}

#[test]
fn test_cycle_fails_compilation() {
    let mut graph = build_graph(
        vec![
            computed("a", NodeKind::Addition),
            computed("b", NodeKind::Addition),
            computed("out", NodeKind::Display),
        ],
        &[("a", "b", None), ("b", "out", None)],
    );
    graph.connect("b", "a", None).unwrap();

    let result = Compiler::new(&graph).compile();
    assert!(matches!(result, Err(CompileError::CycleDetected { .. })));
}

#[test]
fn test_compile_is_deterministic() {
    let graph = create_diamond_graph();
    let first = Compiler::new(&graph).compile().unwrap();
    let second = Compiler::new(&graph).compile().unwrap();
    assert_eq!(first.source, second.source);
    assert_eq!(first, second);
}

#[test]
fn test_emission_order_is_topological() {
    let graph = create_diamond_graph();
    let program = Compiler::new(&graph).compile().unwrap();
    let order: Vec<NodeId> = program.variables.keys().cloned().collect();
    assert_topological(&graph, &order);
}

#[test]
fn test_named_nodes_use_their_names() {
    let graph = build_graph(
        vec![
            number("a", 1.0).with_name("Unit Price"),
            number("b", 2.0).with_name("for"),
            computed("total", NodeKind::Multiplication).with_name("Total"),
        ],
        &[("a", "total", None), ("b", "total", None)],
    );
    let source = body_of(&graph);
    assert!(source.contains("    unit_price = 1"));
    assert!(source.contains("    for_2 = 2"));
    assert!(source.contains("    total = unit_price * for_2"));
}

#[test]
fn test_builder_options() {
    let graph = create_sort_graph();
    let program = Compiler::builder(&graph)
        .with_function_name("run")
        .with_indent("\t")
        .with_header(false)
        .build()
        .compile()
        .unwrap();

    assert!(program.source.starts_with("def run():\n\tlist_1 = [3, 1, 2]"));
    assert!(program.source.ends_with("\tresult = run()\n\tprint(f\"Result: {result}\")"));
}

#[test]
fn test_invalid_function_name_is_ignored() {
    let graph = create_sort_graph();
    let compiler = Compiler::builder(&graph).with_function_name("2 bad").build();
    assert_eq!(compiler.options().function_name, "calculate");
}

#[test]
fn test_list_operations_emit_python() {
    let graph = build_graph(
        vec![
            list("items", &[1.0, 2.0]),
            computed(
                "pushed",
                NodeKind::ListOperation(ListConfig::new(ListOp::Push).with_push_value("5")),
            ),
            computed(
                "doubled",
                NodeKind::ListOperation(ListConfig::new(ListOp::Map)),
            ),
            computed(
                "joined",
                NodeKind::ListOperation(ListConfig::new(ListOp::Join).with_delimiter("-")),
            ),
        ],
        &[
            ("items", "pushed", Some("target")),
            ("pushed", "doubled", Some("target")),
            ("doubled", "joined", Some("target")),
        ],
    );
    let source = body_of(&graph);
    assert!(source.contains("    list_result_2 = list_1 + [5]"));
    assert!(source.contains("    list_result_3 = [x * 2 for x in list_result_2]"));
    assert!(source.contains("    list_result_4 = \"-\".join(str(v) for v in list_result_3)"));
}

#[test]
fn test_compiled_sink_matches_live_value() {
    let graph = create_sort_graph();
    let engine = settled(graph);
    let program = engine.compile().unwrap();

    let var = program.variable_of("sorted").unwrap();
    let live = engine.value_of("sorted").unwrap();
    assert_eq!(live.python_literal(), "[1, 2, 3]");
    assert!(program.source.contains(&format!("return {}", var)));
}

#[test]
fn test_inputs_without_a_variable_keep_their_slot() {
    let graph = build_graph(
        vec![
            computed("blank", NodeKind::Display),
            number("five", 5.0),
            computed("diff", NodeKind::Subtraction),
        ],
        &[("blank", "diff", None), ("five", "diff", None)],
    );
    let engine = settled(graph);
    assert_eq!(engine.value_of("diff"), Some(&Value::Number(-5.0)));

    let program = engine.compile().unwrap();
    assert!(
        program
            .source
            .contains("    # Missing input 'a' on node 'diff', using 0\n    diff_2 = 0 - num_1")
    );
}

#[test]
fn test_float_results_are_converted_to_text_like_live_values() {
    let graph = build_graph(
        vec![
            number("eight", 8.0),
            number("two", 2.0),
            computed("quotient", NodeKind::Division),
            text("suffix", "x"),
            computed(
                "label",
                NodeKind::StringOperation(StringConfig::new(StringOp::Concat)),
            ),
        ],
        &[
            ("eight", "quotient", Some("a")),
            ("two", "quotient", Some("b")),
            ("quotient", "label", Some("left")),
            ("suffix", "label", Some("right")),
        ],
    );
    let engine = settled(graph);
    assert_eq!(engine.value_of("label"), Some(&Value::from("4x")));

    let program = engine.compile().unwrap();
    let helper = [
        "# Generated Python code",
        "def _text(value):",
        "    if isinstance(value, float) and value.is_integer() and abs(value) < 1e16:",
        "        return str(int(value))",
        "    if isinstance(value, list):",
        "        return \"[\" + \", \".join(repr(v) if isinstance(v, str) else _text(v) for v in value) + \"]\"",
        "    return str(value)",
        "",
        "def calculate():",
    ]
    .join("\n");
    assert!(program.source.starts_with(&helper));
    assert!(
        program
            .source
            .contains("    str_result_5 = _text(quotient_3) + str(str_4)")
    );
}

#[test]
fn test_integer_programs_have_no_text_helper() {
    let graph = build_graph(
        vec![
            number("a", 1.0),
            text("b", "!"),
            computed(
                "label",
                NodeKind::StringOperation(StringConfig::new(StringOp::Concat)),
            ),
        ],
        &[("a", "label", Some("left")), ("b", "label", Some("right"))],
    );
    let source = body_of(&graph);
    assert!(!source.contains("_text"));
    assert!(source.contains("    str_result_3 = str(num_1) + str(str_2)"));
}

#[test]
fn test_surplus_edges_are_reported() {
    let graph = build_graph(
        vec![
            number("a", 1.0),
            number("b", 2.0),
            computed("out", NodeKind::Display),
        ],
        &[("a", "out", None), ("b", "out", None)],
    );
    let program = Compiler::new(&graph).compile().unwrap();

    assert!(
        program
            .source
            .contains("    # Ignoring 1 extra input(s) on node 'out'\n    print(num_1)")
    );
    assert_eq!(
        program.diagnostics,
        vec![Diagnostic::SurplusInputs {
            node_id: NodeId::from("out"),
            count: 1,
        }]
    );
    assert_eq!(settled(graph).value_of("out"), Some(&Value::Number(1.0)));
}

#[test]
fn test_huge_numbers_stay_floats() {
    let graph = build_graph(
        vec![
            number("a", 1e300),
            number("b", 1e300),
            computed("product", NodeKind::Multiplication),
        ],
        &[("a", "product", None), ("b", "product", None)],
    );
    let source = body_of(&graph);
    assert!(source.contains("    num_1 = 1e+300"));
    assert!(source.contains("    product_3 = num_1 * num_2"));
    assert_eq!(
        settled(graph).value_of("product"),
        Some(&Value::Number(f64::INFINITY))
    );
}
