// src/dag/graph.rs

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{PlanError, Result};
use crate::types::NodeId;

/// A unit of work and the capacity it occupies on the shared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub resource: u64,
}

/// Data dependency `from -> to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    /// Cost charged to the cut when the edge crosses a group boundary.
    pub bitwidth: u64,
    /// Extra latency between the producer's output and the consumer's input.
    pub delay: u64,
}

/// Predecessor / successor lists and per-node incident edge indices.
#[derive(Debug, Clone, Default)]
struct Adjacency {
    preds: HashMap<NodeId, Vec<NodeId>>,
    succs: HashMap<NodeId, Vec<NodeId>>,
    incident: HashMap<NodeId, Vec<usize>>,
}

/// Task graph: the authoritative node and edge store.
///
/// Nodes are keyed by id, edges are kept in insertion order. Adjacency is a
/// derived view built on first use and thrown away on every mutation; it is
/// never patched in place.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: BTreeMap<NodeId, Node>,
    edges: Vec<Edge>,
    edge_index: HashMap<(NodeId, NodeId), usize>,
    adjacency: OnceCell<Adjacency>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Fails if the id is already taken.
    pub fn add_node(&mut self, node: Node) -> Result<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(PlanError::Precondition(format!(
                "duplicate node id {}",
                node.id
            )));
        }
        self.nodes.insert(node.id, node);
        self.adjacency = OnceCell::new();
        Ok(())
    }

    /// Insert an edge between two existing nodes.
    ///
    /// Rejects self-loops, unknown endpoints and a second edge for the same
    /// ordered pair. Acyclicity is *not* checked here; see
    /// [`Graph::ensure_acyclic`].
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        if edge.from == edge.to {
            return Err(PlanError::Precondition(format!(
                "self-loop on node {}",
                edge.from
            )));
        }
        for endpoint in [edge.from, edge.to] {
            if !self.nodes.contains_key(&endpoint) {
                return Err(PlanError::Precondition(format!(
                    "edge {} -> {} references unknown node {}",
                    edge.from, edge.to, endpoint
                )));
            }
        }
        if self.edge_index.contains_key(&(edge.from, edge.to)) {
            return Err(PlanError::Precondition(format!(
                "duplicate edge {} -> {}",
                edge.from, edge.to
            )));
        }

        self.edge_index
            .insert((edge.from, edge.to), self.edges.len());
        self.edges.push(edge);
        self.adjacency = OnceCell::new();
        Ok(())
    }

    /// All nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn edge(&self, from: NodeId, to: NodeId) -> Option<&Edge> {
        self.edge_index.get(&(from, to)).map(|&i| &self.edges[i])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Resource demand of `id`, or 0 for an unknown node.
    pub fn resource_of(&self, id: NodeId) -> u64 {
        self.nodes.get(&id).map(|n| n.resource).unwrap_or(0)
    }

    /// Direct producers of `id`, in edge insertion order.
    pub fn predecessors(&self, id: NodeId) -> &[NodeId] {
        self.adjacency()
            .preds
            .get(&id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Direct consumers of `id`, in edge insertion order.
    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        self.adjacency()
            .succs
            .get(&id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Edges touching `id` in either direction.
    pub fn incident_edges(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.adjacency()
            .incident
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&i| &self.edges[i])
    }

    fn adjacency(&self) -> &Adjacency {
        self.adjacency.get_or_init(|| {
            let mut adj = Adjacency::default();
            for (i, edge) in self.edges.iter().enumerate() {
                adj.preds.entry(edge.to).or_default().push(edge.from);
                adj.succs.entry(edge.from).or_default().push(edge.to);
                adj.incident.entry(edge.from).or_default().push(i);
                adj.incident.entry(edge.to).or_default().push(i);
            }
            adj
        })
    }

    /// Fail with [`PlanError::Precondition`] if the edges form a directed cycle.
    pub fn ensure_acyclic(&self) -> Result<()> {
        let mut graph: DiGraphMap<NodeId, ()> = DiGraphMap::new();
        for id in self.nodes.keys() {
            graph.add_node(*id);
        }
        for edge in &self.edges {
            graph.add_edge(edge.from, edge.to, ());
        }

        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => Err(PlanError::Precondition(format!(
                "cycle detected in task graph involving node {}",
                cycle.node_id()
            ))),
        }
    }

    /// Topological order of the whole graph.
    ///
    /// Kahn's algorithm; among ready nodes the smallest id goes first, so the
    /// result only depends on the node and edge sets.
    pub fn topological_order(&self) -> Result<Vec<NodeId>> {
        let members: BTreeSet<NodeId> = self.nodes.keys().copied().collect();
        let order = self.subgraph_order(&members);
        if order.len() != self.nodes.len() {
            self.ensure_acyclic()?;
        }
        Ok(order)
    }

    /// Topological order of the subgraph induced by `members`.
    ///
    /// Only edges with both endpoints in `members` constrain the order. Nodes
    /// caught in a cycle are left out of the result.
    pub fn subgraph_order(&self, members: &BTreeSet<NodeId>) -> Vec<NodeId> {
        let mut in_degree: BTreeMap<NodeId, usize> =
            members.iter().map(|&id| (id, 0)).collect();
        for edge in &self.edges {
            if members.contains(&edge.from) && members.contains(&edge.to) {
                *in_degree.entry(edge.to).or_default() += 1;
            }
        }

        let mut ready: BTreeSet<NodeId> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut order = Vec::with_capacity(members.len());

        while let Some(id) = ready.pop_first() {
            order.push(id);
            for succ in self.successors(id) {
                if let Some(deg) = in_degree.get_mut(succ) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.insert(*succ);
                    }
                }
            }
        }

        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Graph {
        let mut g = Graph::new();
        for id in [4, 3, 2, 1] {
            g.add_node(Node { id, resource: 10 }).unwrap();
        }
        for (from, to) in [(1, 2), (1, 3), (2, 4), (3, 4)] {
            g.add_edge(Edge {
                from,
                to,
                bitwidth: 8,
                delay: 1,
            })
            .unwrap();
        }
        g
    }

    #[test]
    fn topological_order_breaks_ties_by_smallest_id() {
        assert_eq!(diamond().topological_order().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn adjacency_is_rebuilt_after_mutation() {
        let mut g = diamond();
        assert_eq!(g.successors(4), &[] as &[NodeId]);

        g.add_node(Node { id: 5, resource: 1 }).unwrap();
        g.add_edge(Edge {
            from: 4,
            to: 5,
            bitwidth: 1,
            delay: 0,
        })
        .unwrap();

        assert_eq!(g.successors(4), &[5]);
        assert_eq!(g.predecessors(5), &[4]);
        assert_eq!(g.incident_edges(4).count(), 3);
    }

    #[test]
    fn rejects_duplicate_edge_and_self_loop() {
        let mut g = diamond();
        let dup = Edge {
            from: 1,
            to: 2,
            bitwidth: 1,
            delay: 0,
        };
        assert!(matches!(g.add_edge(dup), Err(PlanError::Precondition(_))));

        let self_loop = Edge {
            from: 3,
            to: 3,
            bitwidth: 1,
            delay: 0,
        };
        assert!(matches!(
            g.add_edge(self_loop),
            Err(PlanError::Precondition(_))
        ));
    }

    #[test]
    fn rejects_unknown_endpoint() {
        let mut g = diamond();
        let err = g
            .add_edge(Edge {
                from: 1,
                to: 99,
                bitwidth: 1,
                delay: 0,
            })
            .unwrap_err();
        assert!(err.to_string().contains("unknown node 99"));
    }

    #[test]
    fn cycle_fails_topological_order() {
        let mut g = diamond();
        g.add_edge(Edge {
            from: 4,
            to: 1,
            bitwidth: 1,
            delay: 0,
        })
        .unwrap();

        assert!(matches!(g.ensure_acyclic(), Err(PlanError::Precondition(_))));
        assert!(matches!(
            g.topological_order(),
            Err(PlanError::Precondition(_))
        ));
    }

    #[test]
    fn subgraph_order_ignores_outside_edges() {
        let g = diamond();
        let members: BTreeSet<NodeId> = [3, 4].into_iter().collect();
        assert_eq!(g.subgraph_order(&members), vec![3, 4]);

        let apart: BTreeSet<NodeId> = [2, 3].into_iter().collect();
        assert_eq!(g.subgraph_order(&apart), vec![2, 3]);
    }
}
