//! Live evaluation and change propagation.
//!
//! Every mutation moves the engine from `Idle` to `Dirty`, recomputes the
//! nodes forward-reachable from the edit in resolver order, and returns to
//! `Idle`. The nodes whose values changed are reported back to the caller
//! as [`ValueChange`]s.

mod change;

pub use change::{EngineState, ValueChange};

use crate::ast::Value;
use crate::compiler::{CompiledProgram, Compiler};
use crate::error::{CompileError, EvaluationError, ResolveError};
use crate::graph::{Edge, EdgeId, Graph, Node, NodeId};
use crate::resolver::Resolver;
use crate::semantics::{Inputs, NodeKind, evaluate};
use ahash::AHashSet;
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// Owns a graph and keeps every node's live value consistent with it.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    graph: Graph,
    state: EngineState,
}

impl Engine {
    /// Wraps a graph as-is. Call [`Engine::settle_all`] to compute values.
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            state: EngineState::Dirty,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn value_of(&self, id: &str) -> Option<&Value> {
        self.graph.node(id).map(|node| &node.value)
    }

    /// Generates the program for the current graph.
    pub fn compile(&self) -> Result<CompiledProgram, CompileError> {
        Compiler::new(&self.graph).compile()
    }

    /// Replaces the literal of an input node.
    pub fn set_value(
        &mut self,
        id: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<ValueChange>, EvaluationError> {
        let node = self
            .graph
            .node_mut(id)
            .ok_or_else(|| EvaluationError::NodeNotFound(NodeId::from(id)))?;
        if !node.kind.is_input() {
            return Err(EvaluationError::NotAnInput {
                node_id: node.id.clone(),
                kind: node.kind.type_name().to_string(),
            });
        }

        let value = node.kind.coerce_literal(value.into());
        let mut changes = Vec::new();
        if node.value != value {
            node.value = value.clone();
            changes.push(ValueChange {
                node_id: node.id.clone(),
                value,
            });
        }
        let seed = node.id.clone();
        self.settle(vec![seed], changes)
    }

    /// Replaces a node's kind, including its operator and configuration.
    pub fn set_kind(
        &mut self,
        id: &str,
        kind: NodeKind,
    ) -> Result<Vec<ValueChange>, EvaluationError> {
        let node = self
            .graph
            .node_mut(id)
            .ok_or_else(|| EvaluationError::NodeNotFound(NodeId::from(id)))?;
        node.kind = kind;

        let mut changes = Vec::new();
        if node.kind.is_input() {
            let literal = node.kind.coerce_literal(node.value.clone());
            if literal != node.value {
                node.value = literal.clone();
                changes.push(ValueChange {
                    node_id: node.id.clone(),
                    value: literal,
                });
            }
        }
        let seed = node.id.clone();
        self.settle(vec![seed], changes)
    }

    /// Renames a node. Names only affect generated code, so nothing is
    /// recomputed.
    pub fn set_name(
        &mut self,
        id: &str,
        name: Option<String>,
    ) -> Result<Vec<ValueChange>, EvaluationError> {
        let node = self
            .graph
            .node_mut(id)
            .ok_or_else(|| EvaluationError::NodeNotFound(NodeId::from(id)))?;
        node.name = name.filter(|n| !n.trim().is_empty());
        Ok(Vec::new())
    }

    pub fn insert_node(&mut self, mut node: Node) -> Result<Vec<ValueChange>, EvaluationError> {
        if node.kind.is_input() {
            node.value = node.kind.coerce_literal(std::mem::take(&mut node.value));
        }
        let seed = node.id.clone();
        self.graph.add_node(node)?;
        self.settle(vec![seed], Vec::new())
    }

    /// Removes a node and its edges, then recomputes its former consumers.
    pub fn remove_node(&mut self, id: &str) -> Result<Vec<ValueChange>, EvaluationError> {
        let (node, edges) = self.graph.remove_node(id)?;
        let seeds = edges
            .into_iter()
            .filter(|edge| edge.source == node.id && edge.target != node.id)
            .map(|edge| edge.target)
            .collect();
        self.settle(seeds, Vec::new())
    }

    /// Connects `source` to `target` under a generated edge id.
    ///
    /// An edge that would close a cycle, or that starts at a node of unknown
    /// kind, is rejected and the graph is left unchanged.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        target_handle: Option<&str>,
    ) -> Result<(EdgeId, Vec<ValueChange>), EvaluationError> {
        let edge_id = self.graph.connect(source, target, target_handle)?;
        self.reject_invalid_edge(&edge_id, source, target)?;
        let changes = self.settle(vec![NodeId::from(target)], Vec::new())?;
        Ok((edge_id, changes))
    }

    /// Adds a fully specified edge, with the same checks as
    /// [`Engine::connect`].
    pub fn insert_edge(&mut self, edge: Edge) -> Result<Vec<ValueChange>, EvaluationError> {
        let (edge_id, source, target) = (edge.id.clone(), edge.source.clone(), edge.target.clone());
        self.graph.add_edge(edge)?;
        self.reject_invalid_edge(&edge_id, &source, &target)?;
        self.settle(vec![target], Vec::new())
    }

    pub fn disconnect(&mut self, edge_id: &str) -> Result<Vec<ValueChange>, EvaluationError> {
        let edge = self.graph.remove_edge(edge_id)?;
        self.settle(vec![edge.target], Vec::new())
    }

    /// Recomputes every node of the graph.
    pub fn settle_all(&mut self) -> Result<Vec<ValueChange>, EvaluationError> {
        let seeds = self.graph.node_ids().cloned().collect();
        self.settle(seeds, Vec::new())
    }

    /// Removes a freshly added edge again if the graph cannot evaluate with it.
    fn reject_invalid_edge(
        &mut self,
        edge_id: &EdgeId,
        source: &str,
        target: &str,
    ) -> Result<(), EvaluationError> {
        let unknown = match self.graph.node(source).map(|node| &node.kind) {
            Some(NodeKind::Unknown(type_name)) => Some(type_name.clone()),
            _ => None,
        };
        if let Some(type_name) = unknown {
            self.graph.remove_edge(edge_id)?;
            debug!(edge = %edge_id, node = source, "rejected edge from a node of unknown kind");
            return Err(EvaluationError::UnknownKind {
                node_id: NodeId::from(source),
                type_name,
            });
        }

        match Resolver::new(&self.graph).evaluation_order(target) {
            Err(ResolveError::CycleDetected { node_id }) => {
                self.graph.remove_edge(edge_id)?;
                debug!(edge = %edge_id, node = %node_id, "rejected edge closing a cycle");
                Err(EvaluationError::CycleDetected { node_id })
            }
            Err(other) => Err(other.into()),
            Ok(_) => Ok(()),
        }
    }

    fn settle(
        &mut self,
        seeds: Vec<NodeId>,
        mut changes: Vec<ValueChange>,
    ) -> Result<Vec<ValueChange>, EvaluationError> {
        self.state = EngineState::Dirty;

        let affected = self.forward_closure(seeds);
        let order = Resolver::new(&self.graph).order_subset(&affected)?;
        debug!(affected = order.len(), "settling graph");

        for id in order {
            if let Some(value) = self.recompute(&id)? {
                changes.push(ValueChange { node_id: id, value });
            }
        }

        self.state = EngineState::Idle;
        Ok(changes)
    }

    /// The seeds and every node reachable from them, breadth first.
    fn forward_closure(&self, seeds: Vec<NodeId>) -> Vec<NodeId> {
        let mut visited: AHashSet<NodeId> = AHashSet::new();
        let mut closure = Vec::new();
        let mut queue: VecDeque<NodeId> = seeds
            .into_iter()
            .filter(|id| self.graph.contains_node(id))
            .collect();

        while let Some(id) = queue.pop_front() {
            if !visited.insert(id.clone()) {
                continue;
            }
            for edge in self.graph.edges_out_of(&id) {
                if !visited.contains(&edge.target) {
                    queue.push_back(edge.target.clone());
                }
            }
            closure.push(id);
        }
        closure
    }

    /// Re-evaluates one node. Returns the new value when it changed.
    fn recompute(&mut self, id: &NodeId) -> Result<Option<Value>, EvaluationError> {
        let graph = &self.graph;
        let node = graph
            .node(id)
            .ok_or_else(|| EvaluationError::NodeNotFound(id.clone()))?;

        if let NodeKind::Unknown(type_name) = &node.kind {
            if graph.has_outgoing(id) {
                return Err(EvaluationError::UnknownKind {
                    node_id: id.clone(),
                    type_name: type_name.clone(),
                });
            }
            warn!(node = %id, kind = %type_name, "skipping node of unknown kind");
            return Ok(None);
        }

        let inputs = Inputs::bind(
            node.kind.input_slots(),
            graph.edges_into(id).filter_map(|edge| {
                graph
                    .node(&edge.source)
                    .map(|source| (edge.target_handle.as_deref(), source.value.clone()))
            }),
        );
        if inputs.unbound() > 0 {
            debug!(node = %id, unbound = inputs.unbound(), "ignoring surplus inputs");
        }

        let value = evaluate(&node.kind, &node.value, &inputs);
        if value == node.value {
            return Ok(None);
        }
        trace!(node = %id, value = %value, "value changed");
        if let Some(node) = self.graph.node_mut(id) {
            node.value = value.clone();
        }
        Ok(Some(value))
    }
}
