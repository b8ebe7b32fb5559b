// src/dag/partitioning.rs

use std::collections::{BTreeMap, BTreeSet};

use crate::dag::graph::Graph;
use crate::dag::quotient::QuotientGraph;
use crate::errors::{PlanError, Result};
use crate::types::{NodeId, PartitionId};

/// Ordered collection of node groups plus the inverse node → group index.
///
/// Every node of the graph it was built for lives in exactly one non-empty
/// group. All mutations go through [`Partitioning::move_node`], which keeps the
/// index consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partitioning {
    groups: Vec<BTreeSet<NodeId>>,
    index: BTreeMap<NodeId, PartitionId>,
}

impl Partitioning {
    /// Build from explicit groups, checking that they cover `graph` exactly
    /// once. Empty groups are dropped.
    pub fn from_groups(graph: &Graph, groups: Vec<BTreeSet<NodeId>>) -> Result<Self> {
        let groups: Vec<BTreeSet<NodeId>> = groups.into_iter().filter(|g| !g.is_empty()).collect();
        let mut index = BTreeMap::new();

        for (pid, group) in groups.iter().enumerate() {
            for &id in group {
                if !graph.contains(id) {
                    return Err(PlanError::Precondition(format!(
                        "partition {pid} references unknown node {id}"
                    )));
                }
                if let Some(prev) = index.insert(id, pid) {
                    return Err(PlanError::Precondition(format!(
                        "node {id} appears in partitions {prev} and {pid}"
                    )));
                }
            }
        }

        let partitioning = Self { groups, index };
        partitioning.check_cover(graph)?;
        Ok(partitioning)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[BTreeSet<NodeId>] {
        &self.groups
    }

    pub fn group(&self, pid: PartitionId) -> Option<&BTreeSet<NodeId>> {
        self.groups.get(pid)
    }

    pub fn partition_of(&self, id: NodeId) -> Option<PartitionId> {
        self.index.get(&id).copied()
    }

    /// Total resource demand of one group.
    pub fn resource_of(&self, graph: &Graph, pid: PartitionId) -> u64 {
        self.groups
            .get(pid)
            .map(|g| g.iter().map(|&id| graph.resource_of(id)).sum())
            .unwrap_or(0)
    }

    /// Resource demand of every group, by index.
    pub fn resources(&self, graph: &Graph) -> Vec<u64> {
        (0..self.groups.len())
            .map(|pid| self.resource_of(graph, pid))
            .collect()
    }

    /// Sum of bitwidths over edges whose endpoints sit in different groups.
    pub fn cut_cost(&self, graph: &Graph) -> u64 {
        graph
            .edges()
            .iter()
            .filter(|e| self.partition_of(e.from) != self.partition_of(e.to))
            .map(|e| e.bitwidth)
            .sum()
    }

    pub fn quotient(&self, graph: &Graph) -> QuotientGraph {
        self.quotient_with(graph, |id| self.partition_of(id))
    }

    /// Quotient graph as it would look with `node` reassigned to `to`.
    pub fn quotient_with_move(&self, graph: &Graph, node: NodeId, to: PartitionId) -> QuotientGraph {
        self.quotient_with(graph, |id| {
            if id == node {
                Some(to)
            } else {
                self.partition_of(id)
            }
        })
    }

    fn quotient_with(
        &self,
        graph: &Graph,
        lookup: impl Fn(NodeId) -> Option<PartitionId>,
    ) -> QuotientGraph {
        let crossings = graph
            .edges()
            .iter()
            .filter_map(|e| Some((lookup(e.from)?, lookup(e.to)?)));
        QuotientGraph::from_crossings(self.groups.len(), crossings)
    }

    /// Reassign `node` to group `to`.
    ///
    /// A group left empty is dropped and the ids after it shift down by one;
    /// the index is rebuilt from the groups. Returns the destination's id
    /// after compaction.
    pub fn move_node(&mut self, node: NodeId, to: PartitionId) -> Result<PartitionId> {
        let from = self.partition_of(node).ok_or_else(|| {
            PlanError::Precondition(format!("node {node} is not in any partition"))
        })?;
        if to >= self.groups.len() {
            return Err(PlanError::Precondition(format!(
                "partition {to} does not exist ({} partitions)",
                self.groups.len()
            )));
        }
        if from == to {
            return Ok(to);
        }

        self.groups[from].remove(&node);
        self.groups[to].insert(node);

        let mut dest = to;
        if self.groups[from].is_empty() {
            self.groups.remove(from);
            if from < to {
                dest -= 1;
            }
        }
        self.rebuild_index();

        Ok(dest)
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .groups
            .iter()
            .enumerate()
            .flat_map(|(pid, g)| g.iter().map(move |&id| (id, pid)))
            .collect();
    }

    /// Check that every node of `graph` is in exactly one group and no group
    /// is empty.
    pub fn check_cover(&self, graph: &Graph) -> Result<()> {
        if let Some(pid) = self.groups.iter().position(|g| g.is_empty()) {
            return Err(PlanError::Precondition(format!("partition {pid} is empty")));
        }

        let assigned: usize = self.groups.iter().map(|g| g.len()).sum();
        if assigned != self.index.len() {
            return Err(PlanError::Precondition(
                "a node is assigned to more than one partition".to_string(),
            ));
        }

        for node in graph.nodes() {
            if !self.index.contains_key(&node.id) {
                return Err(PlanError::Precondition(format!(
                    "node {} is not assigned to any partition",
                    node.id
                )));
            }
        }
        if self.index.len() != graph.node_count() {
            return Err(PlanError::Precondition(
                "partitioning references nodes outside the graph".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::graph::{Edge, Node};

    fn chain(n: u32) -> Graph {
        let mut g = Graph::new();
        for id in 1..=n {
            g.add_node(Node { id, resource: 10 * id as u64 }).unwrap();
        }
        for id in 1..n {
            g.add_edge(Edge {
                from: id,
                to: id + 1,
                bitwidth: id as u64,
                delay: 0,
            })
            .unwrap();
        }
        g
    }

    fn groups(sets: &[&[NodeId]]) -> Vec<BTreeSet<NodeId>> {
        sets.iter().map(|s| s.iter().copied().collect()).collect()
    }

    #[test]
    fn from_groups_rejects_missing_and_duplicate_nodes() {
        let g = chain(3);
        assert!(Partitioning::from_groups(&g, groups(&[&[1, 2]])).is_err());
        assert!(Partitioning::from_groups(&g, groups(&[&[1, 2], &[2, 3]])).is_err());
        assert!(Partitioning::from_groups(&g, groups(&[&[1, 2], &[3, 4]])).is_err());
    }

    #[test]
    fn cut_cost_and_resources() {
        let g = chain(4);
        let p = Partitioning::from_groups(&g, groups(&[&[1, 2], &[3, 4]])).unwrap();
        assert_eq!(p.cut_cost(&g), 2);
        assert_eq!(p.resources(&g), vec![30, 70]);
    }

    #[test]
    fn move_node_compacts_empty_groups_and_reindexes() {
        let g = chain(4);
        let mut p = Partitioning::from_groups(&g, groups(&[&[1], &[2, 3], &[4]])).unwrap();

        let dest = p.move_node(1, 1).unwrap();
        assert_eq!(dest, 0);
        assert_eq!(p.len(), 2);
        assert_eq!(p.partition_of(1), Some(0));
        assert_eq!(p.partition_of(4), Some(1));
        p.check_cover(&g).unwrap();
    }

    #[test]
    fn simulated_move_does_not_touch_state() {
        let g = chain(3);
        let p = Partitioning::from_groups(&g, groups(&[&[1], &[2], &[3]])).unwrap();
        let before = p.clone();

        // Moving 2 into group 2 keeps 0 -> 2; moving 1 into group 2 creates 2 -> 1 -> 2.
        assert!(p.quotient_with_move(&g, 2, 2).is_acyclic());
        assert!(!p.quotient_with_move(&g, 1, 2).is_acyclic());
        assert_eq!(p, before);
    }

    #[test]
    fn quotient_is_recomputed_identically() {
        let g = chain(5);
        let p = Partitioning::from_groups(&g, groups(&[&[1, 2], &[3], &[4, 5]])).unwrap();
        assert_eq!(p.quotient(&g), p.quotient(&g));
        assert_eq!(p.quotient(&g).levels(), vec![0, 1, 2]);
    }
}
