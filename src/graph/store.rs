use super::{Edge, EdgeId, Node, NodeId};
use crate::error::GraphError;
use ahash::AHashMap;
use indexmap::IndexMap;

/// Holds the nodes and edges of one graph.
///
/// Nodes and edges iterate in insertion order, and the edges into a node
/// iterate in connection order. The store never recomputes anything and has
/// no notion of what a node kind means.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
    incoming: AHashMap<NodeId, Vec<EdgeId>>,
    outgoing: AHashMap<NodeId, Vec<EdgeId>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.nodes.contains_key(node.id.as_str()) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Removes a node together with every edge touching it.
    ///
    /// Returns the node and the removed edges, so callers can re-evaluate
    /// the former downstream consumers.
    pub fn remove_node(&mut self, id: &str) -> Result<(Node, Vec<Edge>), GraphError> {
        if !self.nodes.contains_key(id) {
            return Err(GraphError::NodeNotFound(NodeId::from(id)));
        }

        let mut incident: Vec<EdgeId> = Vec::new();
        for edge_id in self
            .incoming
            .get(id)
            .into_iter()
            .chain(self.outgoing.get(id))
            .flatten()
        {
            if !incident.contains(edge_id) {
                incident.push(edge_id.clone());
            }
        }

        let mut removed = Vec::with_capacity(incident.len());
        for edge_id in incident {
            removed.push(self.remove_edge(&edge_id)?);
        }

        self.incoming.remove(id);
        self.outgoing.remove(id);
        let node = self
            .nodes
            .shift_remove(id)
            .ok_or_else(|| GraphError::NodeNotFound(NodeId::from(id)))?;
        Ok((node, removed))
    }

    /// Adds an edge. A labelled target handle accepts a single edge; edges
    /// without a target handle bind positionally and may accumulate.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if self.edges.contains_key(edge.id.as_str()) {
            return Err(GraphError::DuplicateEdge(edge.id));
        }
        for endpoint in [&edge.source, &edge.target] {
            if !self.nodes.contains_key(endpoint.as_str()) {
                return Err(GraphError::NodeNotFound(endpoint.clone()));
            }
        }
        if let Some(handle) = &edge.target_handle {
            if let Some(existing) = self
                .edges_into(&edge.target)
                .find(|e| e.target_handle.as_ref() == Some(handle))
            {
                return Err(GraphError::HandleOccupied {
                    target: edge.target.clone(),
                    handle: Some(handle.clone()),
                    occupied_by: existing.id.clone(),
                });
            }
        }

        self.incoming
            .entry(edge.target.clone())
            .or_default()
            .push(edge.id.clone());
        self.outgoing
            .entry(edge.source.clone())
            .or_default()
            .push(edge.id.clone());
        self.edges.insert(edge.id.clone(), edge);
        Ok(())
    }

    /// Connects `source` to `target` under a generated edge id.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        target_handle: Option<&str>,
    ) -> Result<EdgeId, GraphError> {
        let base = match target_handle {
            Some(handle) => format!("{}->{}:{}", source, target, handle),
            None => format!("{}->{}", source, target),
        };
        let mut id = EdgeId::new(base.clone());
        let mut suffix = 1;
        while self.edges.contains_key(id.as_str()) {
            suffix += 1;
            id = EdgeId::new(format!("{}#{}", base, suffix));
        }

        let mut edge = Edge::new(id.clone(), source, target);
        edge.target_handle = target_handle.map(str::to_string);
        self.add_edge(edge)?;
        Ok(id)
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<Edge, GraphError> {
        let edge = self
            .edges
            .shift_remove(id)
            .ok_or_else(|| GraphError::EdgeNotFound(EdgeId::from(id)))?;
        if let Some(ids) = self.incoming.get_mut(edge.target.as_str()) {
            ids.retain(|e| e != &edge.id);
        }
        if let Some(ids) = self.outgoing.get_mut(edge.source.as_str()) {
            ids.retain(|e| e != &edge.id);
        }
        Ok(edge)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Edges whose target is `id`, in connection order.
    pub fn edges_into<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Edge> + use<'a> {
        self.incoming
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|edge_id| self.edges.get(edge_id.as_str()))
    }

    /// Edges whose source is `id`, in connection order.
    pub fn edges_out_of<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Edge> + use<'a> {
        self.outgoing
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|edge_id| self.edges.get(edge_id.as_str()))
    }

    pub fn has_outgoing(&self, id: &str) -> bool {
        self.outgoing.get(id).is_some_and(|ids| !ids.is_empty())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::NodeKind;

    fn graph_with(ids: &[&str]) -> Graph {
        let mut graph = Graph::new();
        for id in ids {
            graph.add_node(Node::new(*id, NodeKind::NumberInput)).unwrap();
        }
        graph
    }

    #[test]
    fn positional_edges_accumulate() {
        let mut graph = graph_with(&["a", "b", "sum"]);
        graph.connect("a", "sum", None).unwrap();
        graph.connect("b", "sum", None).unwrap();
        let sources: Vec<&str> = graph.edges_into("sum").map(|e| e.source.as_str()).collect();
        assert_eq!(sources, vec!["a", "b"]);
    }

    #[test]
    fn repeated_connection_gets_a_fresh_id() {
        let mut graph = graph_with(&["a", "sum"]);
        let first = graph.connect("a", "sum", None).unwrap();
        let second = graph.connect("a", "sum", None).unwrap();
        assert_ne!(first, second);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn removing_an_edge_updates_both_adjacency_lists() {
        let mut graph = graph_with(&["a", "b"]);
        let id = graph.connect("a", "b", Some("left")).unwrap();
        graph.remove_edge(&id).unwrap();
        assert!(!graph.has_outgoing("a"));
        assert_eq!(graph.edges_into("b").count(), 0);
        // The handle is free again.
        assert!(graph.connect("a", "b", Some("left")).is_ok());
    }
}
