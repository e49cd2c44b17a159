//! Records expression DAGs into a `petgraph` structure for inspection.
use crate::expression::{ExpressionBase, Optimizer};
use crate::store::{NodeId, ResultKind};
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::prelude::StableDiGraph;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// What the recorder keeps about one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub kind: ResultKind,
    pub is_cache: bool,
    pub arity: usize,
}

/// An `Optimizer` that mirrors every registered node into a directed graph.
///
/// Edges run parent -> child and carry the argument position.
#[derive(Debug, Default)]
pub struct ExpressionGraph {
    graph: StableDiGraph<NodeInfo, usize>,
    index: HashMap<NodeId, NodeIndex>,
    order: Vec<NodeId>,
}

impl ExpressionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the DAG below `root`.
    pub fn from_root(root: &dyn ExpressionBase) -> Self {
        let mut graph = Self::new();
        root.add_to_optimizer(&mut graph);
        graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node identities in the order they were registered (children first).
    pub fn registration_order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn info(&self, id: NodeId) -> Option<&NodeInfo> {
        self.index.get(&id).and_then(|&ix| self.graph.node_weight(ix))
    }

    /// Children of `id` in argument order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&ix) = self.index.get(&id) else {
            return Vec::new();
        };
        let mut edges: Vec<(usize, NodeId)> = self
            .graph
            .edges_directed(ix, Direction::Outgoing)
            .map(|e| (*e.weight(), self.graph[e.target()].id))
            .collect();
        edges.sort_by_key(|&(pos, _)| pos);
        edges.into_iter().map(|(_, child)| child).collect()
    }

    /// Number of distinct parents referencing `id`.
    pub fn parent_count(&self, id: NodeId) -> usize {
        self.index.get(&id).map_or(0, |&ix| {
            let mut parents: Vec<NodeIndex> =
                self.graph.neighbors_directed(ix, Direction::Incoming).collect();
            parents.sort();
            parents.dedup();
            parents.len()
        })
    }

    /// Nodes without parents.
    pub fn roots(&self) -> Vec<NodeId> {
        self.order.iter().copied().filter(|&id| self.parent_count(id) == 0).collect()
    }

    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }

    /// Every node after all of its children.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, String> {
        let sorted = toposort(&self.graph, None).map_err(|cycle| {
            format!("Cycle detected involving node {}", self.graph[cycle.node_id()].id)
        })?;
        Ok(sorted.into_iter().rev().map(|ix| self.graph[ix].id).collect())
    }
}

impl Optimizer for ExpressionGraph {
    fn register(&mut self, node: &dyn ExpressionBase) {
        let args = node.arguments();
        let info = NodeInfo {
            id: node.id(),
            name: node.name().to_string(),
            kind: node.kind(),
            is_cache: node.is_cache(),
            arity: args.len(),
        };
        let ix = self.graph.add_node(info);
        self.index.insert(node.id(), ix);
        self.order.push(node.id());
        for (pos, arg) in args.iter().enumerate() {
            if let Some(&child) = self.index.get(&arg.id()) {
                self.graph.add_edge(ix, child, pos);
            }
        }
    }
}
