use crate::analysis::topology::ExpressionGraph;
use crate::expression::ExpressionBase;
use std::collections::{BTreeMap, HashMap};

/// Shape statistics of an expression DAG.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Nodes referenced by more than one parent.
    pub shared_nodes: usize,
    pub cache_nodes: usize,
    pub leaf_nodes: usize,
    /// Longest root-to-leaf path, counted in nodes.
    pub max_depth: usize,
    pub op_counts: BTreeMap<String, usize>,
    /// Node count the DAG would have if every shared node were duplicated
    /// per reference. Saturates at `u64::MAX`.
    pub tree_size: u64,
}

impl GraphStats {
    pub fn of(root: &dyn ExpressionBase) -> Self {
        Self::analyze(&ExpressionGraph::from_root(root))
    }

    pub fn analyze(graph: &ExpressionGraph) -> Self {
        let mut stats = GraphStats {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            ..Default::default()
        };
        let mut depth: HashMap<_, usize> = HashMap::new();
        let mut size: HashMap<_, u64> = HashMap::new();

        // Registration order puts children before parents.
        for &id in graph.registration_order() {
            let Some(info) = graph.info(id) else { continue };
            *stats.op_counts.entry(info.name.clone()).or_insert(0) += 1;
            if info.is_cache {
                stats.cache_nodes += 1;
            }
            if graph.parent_count(id) > 1 {
                stats.shared_nodes += 1;
            }

            let children = graph.children(id);
            if children.is_empty() {
                stats.leaf_nodes += 1;
            }
            let deepest = children.iter().map(|c| depth.get(c).copied().unwrap_or(0)).max();
            let d = 1 + deepest.unwrap_or(0);
            let s = children
                .iter()
                .map(|c| size.get(c).copied().unwrap_or(0))
                .fold(1u64, u64::saturating_add);
            stats.max_depth = stats.max_depth.max(d);
            depth.insert(id, d);
            size.insert(id, s);
        }

        stats.tree_size = graph
            .roots()
            .iter()
            .filter_map(|r| size.get(r))
            .copied()
            .fold(0, u64::saturating_add);
        stats
    }
}
