//! Dependency ordering.
//!
//! The resolver walks incoming edges depth-first with an explicit stack, so
//! arbitrarily deep chains cannot overflow the call stack. Each node is
//! emitted once, at its first completion, which makes every returned
//! sequence a valid topological order: a dependency always precedes its
//! dependents.
//!
//! A node reached again while it is still on the current path closes a
//! cycle and fails with [`ResolveError::CycleDetected`]. A node reached
//! again after it completed (diamond fan-in) is simply skipped.

use crate::error::ResolveError;
use crate::graph::{Graph, NodeId};
use ahash::AHashSet;
use tracing::trace;

pub struct Resolver<'g> {
    graph: &'g Graph,
}

impl<'g> Resolver<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    /// Upstream dependencies of `id` in evaluation order, without `id` itself.
    pub fn dependencies_of(&self, id: &str) -> Result<Vec<NodeId>, ResolveError> {
        let mut order = self.evaluation_order(id)?;
        order.pop();
        Ok(order)
    }

    /// Upstream dependencies of `id` followed by `id`.
    pub fn evaluation_order(&self, id: &str) -> Result<Vec<NodeId>, ResolveError> {
        let start = self.lookup(id)?;
        let mut walk = Walk::new(self.graph, |_: &NodeId| true);
        walk.visit(start)?;
        trace!(node = %start, count = walk.order.len(), "resolved evaluation order");
        Ok(walk.order)
    }

    /// Orders a set of nodes so that, for every edge between two members,
    /// the source comes first. Edges leaving the set are not followed.
    ///
    /// Members are visited in the order given, so the result is
    /// deterministic for a deterministic input.
    pub fn order_subset(&self, ids: &[NodeId]) -> Result<Vec<NodeId>, ResolveError> {
        let members: AHashSet<&str> = ids.iter().map(NodeId::as_str).collect();
        let mut walk = Walk::new(self.graph, |source: &NodeId| {
            members.contains(source.as_str())
        });
        for id in ids {
            let start = self.lookup(id)?;
            walk.visit(start)?;
        }
        Ok(walk.order)
    }

    fn lookup(&self, id: &str) -> Result<&'g NodeId, ResolveError> {
        self.graph
            .node(id)
            .map(|node| &node.id)
            .ok_or_else(|| ResolveError::NodeNotFound(NodeId::from(id)))
    }
}

enum Step<'g> {
    Enter(&'g NodeId),
    Exit(&'g NodeId),
}

/// Post-order DFS state shared across several start nodes.
struct Walk<'g, F> {
    graph: &'g Graph,
    follow: F,
    on_path: AHashSet<&'g NodeId>,
    done: AHashSet<&'g NodeId>,
    order: Vec<NodeId>,
}

impl<'g, F> Walk<'g, F>
where
    F: Fn(&NodeId) -> bool,
{
    fn new(graph: &'g Graph, follow: F) -> Self {
        Self {
            graph,
            follow,
            on_path: AHashSet::new(),
            done: AHashSet::new(),
            order: Vec::new(),
        }
    }

    fn visit(&mut self, start: &'g NodeId) -> Result<(), ResolveError> {
        let mut stack = vec![Step::Enter(start)];

        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id) => {
                    if self.done.contains(id) {
                        continue;
                    }
                    // Everything on the path is an ancestor of `id`.
                    if !self.on_path.insert(id) {
                        return Err(ResolveError::CycleDetected {
                            node_id: id.clone(),
                        });
                    }
                    stack.push(Step::Exit(id));

                    let sources: Vec<&'g NodeId> = self
                        .graph
                        .edges_into(id)
                        .map(|edge| &edge.source)
                        .filter(|source| (self.follow)(*source))
                        .collect();
                    // Reversed so the first connected input is visited first.
                    for source in sources.into_iter().rev() {
                        if !self.done.contains(source) {
                            stack.push(Step::Enter(source));
                        }
                    }
                }
                Step::Exit(id) => {
                    self.on_path.remove(id);
                    if self.done.insert(id) {
                        self.order.push(id.clone());
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;
    use crate::semantics::NodeKind;

    fn chain(len: usize) -> Graph {
        let mut graph = Graph::new();
        for i in 0..len {
            graph.add_node(Node::new(format!("n{}", i), NodeKind::Addition)).unwrap();
            if i > 0 {
                graph
                    .connect(&format!("n{}", i - 1), &format!("n{}", i), None)
                    .unwrap();
            }
        }
        graph
    }

    #[test]
    fn deep_chains_do_not_overflow() {
        let graph = chain(50_000);
        let deps = Resolver::new(&graph).dependencies_of("n49999").unwrap();
        assert_eq!(deps.len(), 49_999);
        assert_eq!(deps[0].as_str(), "n0");
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let mut graph = chain(1);
        graph.connect("n0", "n0", None).unwrap();
        assert_eq!(
            Resolver::new(&graph).dependencies_of("n0"),
            Err(ResolveError::CycleDetected {
                node_id: NodeId::from("n0")
            })
        );
    }

    #[test]
    fn subset_ignores_outside_edges() {
        let graph = chain(4);
        let subset = vec![NodeId::from("n3"), NodeId::from("n2")];
        let order = Resolver::new(&graph).order_subset(&subset).unwrap();
        assert_eq!(order, vec![NodeId::from("n2"), NodeId::from("n3")]);
    }

    #[test]
    fn missing_start_node() {
        let graph = chain(1);
        assert!(matches!(
            Resolver::new(&graph).evaluation_order("ghost"),
            Err(ResolveError::NodeNotFound(_))
        ));
    }
}
