//! Common test utilities for building graphs.
use kairo::prelude::*;

#[allow(dead_code)]
pub fn number(id: &str, value: f64) -> Node {
    Node::new(id, NodeKind::NumberInput).with_value(value)
}

#[allow(dead_code)]
pub fn text(id: &str, value: &str) -> Node {
    Node::new(id, NodeKind::StringInput).with_value(value)
}

#[allow(dead_code)]
pub fn boolean(id: &str, value: bool) -> Node {
    Node::new(id, NodeKind::BooleanInput).with_value(value)
}

#[allow(dead_code)]
pub fn list(id: &str, items: &[f64]) -> Node {
    let items: Vec<Value> = items.iter().copied().map(Value::from).collect();
    Node::new(id, NodeKind::ListInput).with_value(items)
}

#[allow(dead_code)]
pub fn computed(id: &str, kind: NodeKind) -> Node {
    Node::new(id, kind)
}

/// Builds a graph from nodes and `(source, target, target_handle)` triples.
#[allow(dead_code)]
pub fn build_graph(nodes: Vec<Node>, edges: &[(&str, &str, Option<&str>)]) -> Graph {
    let mut graph = Graph::new();
    for node in nodes {
        graph.add_node(node).unwrap();
    }
    for (source, target, handle) in edges {
        graph.connect(source, target, *handle).unwrap();
    }
    graph
}

/// Wraps a graph in an engine with every value computed.
#[allow(dead_code)]
pub fn settled(graph: Graph) -> Engine {
    let mut engine = Engine::new(graph);
    engine.settle_all().unwrap();
    engine
}

/// `5 + 3 -> Display`
#[allow(dead_code)]
pub fn create_addition_graph() -> Graph {
    build_graph(
        vec![
            number("five", 5.0),
            number("three", 3.0),
            computed("sum", NodeKind::Addition),
            computed("out", NodeKind::Display),
        ],
        &[
            ("five", "sum", None),
            ("three", "sum", None),
            ("sum", "out", None),
        ],
    )
}

/// `4 / 0 -> Display`
#[allow(dead_code)]
pub fn create_division_graph() -> Graph {
    build_graph(
        vec![
            number("four", 4.0),
            number("zero", 0.0),
            computed("quotient", NodeKind::Division),
            computed("out", NodeKind::Display),
        ],
        &[
            ("four", "quotient", Some("a")),
            ("zero", "quotient", Some("b")),
            ("quotient", "out", None),
        ],
    )
}

/// `"yes" if true else "no"`
#[allow(dead_code)]
pub fn create_if_else_graph() -> Graph {
    build_graph(
        vec![
            boolean("flag", true),
            text("yes", "yes"),
            text("no", "no"),
            computed("choice", NodeKind::IfElse),
        ],
        &[
            ("flag", "choice", Some("condition")),
            ("yes", "choice", Some("true")),
            ("no", "choice", Some("false")),
        ],
    )
}

/// `sorted([3, 1, 2])`
#[allow(dead_code)]
pub fn create_sort_graph() -> Graph {
    build_graph(
        vec![
            list("items", &[3.0, 1.0, 2.0]),
            computed("sorted", NodeKind::ListOperation(ListConfig::new(ListOp::Sort))),
        ],
        &[("items", "sorted", Some("target"))],
    )
}

/// `top` feeds `left` and `right`, both of which feed `bottom`.
#[allow(dead_code)]
pub fn create_diamond_graph() -> Graph {
    build_graph(
        vec![
            number("top", 2.0),
            computed("left", NodeKind::Addition),
            computed("right", NodeKind::Multiplication),
            computed("bottom", NodeKind::Subtraction),
        ],
        &[
            ("top", "left", None),
            ("top", "right", None),
            ("left", "bottom", Some("a")),
            ("right", "bottom", Some("b")),
        ],
    )
}

/// Asserts that every edge between two listed nodes points forward.
#[allow(dead_code)]
pub fn assert_topological(graph: &Graph, order: &[NodeId]) {
    let position = |id: &NodeId| order.iter().position(|n| n == id);
    for edge in graph.edges() {
        if let (Some(s), Some(t)) = (position(&edge.source), position(&edge.target)) {
            assert!(s < t, "edge {} -> {} is out of order", edge.source, edge.target);
        }
    }
}
