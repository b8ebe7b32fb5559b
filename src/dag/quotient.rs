// src/dag/quotient.rs

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graphmap::DiGraphMap;

use crate::types::PartitionId;

/// Graph with one vertex per group and an edge wherever at least one task
/// edge crosses between two groups in that direction.
///
/// Always rebuilt from a partitioning; two builds from the same state compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotientGraph {
    vertex_count: usize,
    edges: BTreeSet<(PartitionId, PartitionId)>,
}

impl QuotientGraph {
    /// Build from the group of each edge endpoint.
    ///
    /// `crossings` yields `(group_of_from, group_of_to)` for every task edge;
    /// pairs inside one group are dropped.
    pub fn from_crossings(
        vertex_count: usize,
        crossings: impl IntoIterator<Item = (PartitionId, PartitionId)>,
    ) -> Self {
        let edges = crossings.into_iter().filter(|(a, b)| a != b).collect();
        Self {
            vertex_count,
            edges,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn edges(&self) -> impl Iterator<Item = (PartitionId, PartitionId)> + '_ {
        self.edges.iter().copied()
    }

    pub fn has_edge(&self, from: PartitionId, to: PartitionId) -> bool {
        self.edges.contains(&(from, to))
    }

    fn as_graphmap(&self) -> DiGraphMap<PartitionId, ()> {
        let mut graph = DiGraphMap::new();
        for v in 0..self.vertex_count {
            graph.add_node(v);
        }
        for &(a, b) in &self.edges {
            graph.add_edge(a, b, ());
        }
        graph
    }

    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.as_graphmap())
    }

    /// Groups with no incoming quotient edge, ascending.
    pub fn sources(&self) -> Vec<PartitionId> {
        let targets: BTreeSet<PartitionId> = self.edges.iter().map(|&(_, b)| b).collect();
        (0..self.vertex_count)
            .filter(|v| !targets.contains(v))
            .collect()
    }

    /// A topological order of the groups, or `None` if the quotient is cyclic.
    pub fn topological_order(&self) -> Option<Vec<PartitionId>> {
        toposort(&self.as_graphmap(), None).ok()
    }

    /// Longest path depth, in hops, from any source to each group.
    ///
    /// Relaxes along a topological order so every group is settled once. If
    /// the quotient is cyclic every level is 0.
    pub fn levels(&self) -> Vec<usize> {
        let mut levels = vec![0; self.vertex_count];
        let Some(order) = self.topological_order() else {
            return levels;
        };

        let mut succs: BTreeMap<PartitionId, Vec<PartitionId>> = BTreeMap::new();
        for &(a, b) in &self.edges {
            succs.entry(a).or_default().push(b);
        }

        for v in order {
            let depth = levels[v] + 1;
            for &next in succs.get(&v).into_iter().flatten() {
                if depth > levels[next] {
                    levels[next] = depth;
                }
            }
        }

        levels
    }
}
