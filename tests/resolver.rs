//! Tests for dependency ordering and cycle detection.
mod common;
use common::*;
use kairo::prelude::*;

fn ids(order: &[NodeId]) -> Vec<&str> {
    order.iter().map(NodeId::as_str).collect()
}

#[test]
fn test_evaluation_order_follows_connection_order() {
    let graph = create_addition_graph();
    let order = Resolver::new(&graph).evaluation_order("out").unwrap();
    assert_eq!(ids(&order), vec!["five", "three", "sum", "out"]);
}

#[test]
fn test_dependencies_exclude_the_node() {
    let graph = create_addition_graph();
    let deps = Resolver::new(&graph).dependencies_of("sum").unwrap();
    assert_eq!(ids(&deps), vec!["five", "three"]);
}

#[test]
fn test_diamond_visits_shared_node_once() {
    let graph = create_diamond_graph();
    let order = Resolver::new(&graph).evaluation_order("bottom").unwrap();
    assert_eq!(ids(&order), vec!["top", "left", "right", "bottom"]);
    assert_topological(&graph, &order);
}

#[test]
fn test_cycle_is_detected() {
    let mut graph = build_graph(
        vec![
            computed("a", NodeKind::Addition),
            computed("b", NodeKind::Addition),
            computed("c", NodeKind::Addition),
        ],
        &[("a", "b", None), ("b", "c", None)],
    );
    graph.connect("c", "a", None).unwrap();

    let result = Resolver::new(&graph).evaluation_order("c");
    assert!(matches!(result, Err(ResolveError::CycleDetected { .. })));
}

#[test]
fn test_cycle_upstream_of_the_start_is_detected() {
    let mut graph = build_graph(
        vec![
            computed("a", NodeKind::Addition),
            computed("b", NodeKind::Addition),
            computed("sink", NodeKind::Display),
        ],
        &[("a", "b", None), ("b", "sink", None)],
    );
    graph.connect("b", "a", None).unwrap();

    let result = Resolver::new(&graph).dependencies_of("sink");
    assert!(matches!(result, Err(ResolveError::CycleDetected { .. })));
}

#[test]
fn test_order_subset_is_topological() {
    let graph = create_diamond_graph();
    let subset = vec![
        NodeId::from("bottom"),
        NodeId::from("right"),
        NodeId::from("left"),
    ];
    let order = Resolver::new(&graph).order_subset(&subset).unwrap();
    assert_eq!(order.len(), 3);
    assert_eq!(order.last().map(NodeId::as_str), Some("bottom"));
    assert_topological(&graph, &order);
}

#[test]
fn test_unknown_start_node() {
    let graph = create_addition_graph();
    assert_eq!(
        Resolver::new(&graph).evaluation_order("ghost"),
        Err(ResolveError::NodeNotFound(NodeId::from("ghost")))
    );
}
