#![allow(dead_code)]

use reusedag::config::{ConfigFile, EdgeConfig, NodeConfig, RawConfigFile};
use reusedag::dag::{Edge, Graph, Node};
use reusedag::errors::Result;
use reusedag::types::{CapacityPolicy, NodeId};

/// Builder for `Graph` to simplify test setup.
///
/// Panics on invalid input; use the `Graph` API directly to test rejections.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, id: NodeId, resource: u64) -> Self {
        self.nodes.push(Node { id, resource });
        self
    }

    /// Add nodes `ids` that all demand `resource`.
    pub fn nodes(mut self, ids: impl IntoIterator<Item = NodeId>, resource: u64) -> Self {
        for id in ids {
            self.nodes.push(Node { id, resource });
        }
        self
    }

    pub fn edge(mut self, from: NodeId, to: NodeId, bitwidth: u64, delay: u64) -> Self {
        self.edges.push(Edge {
            from,
            to,
            bitwidth,
            delay,
        });
        self
    }

    pub fn build(self) -> Graph {
        let mut graph = Graph::new();
        for node in self.nodes {
            graph.add_node(node).expect("builder node should be valid");
        }
        for edge in self.edges {
            graph.add_edge(edge).expect("builder edge should be valid");
        }
        graph
    }
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn resource_limit(mut self, limit: u64) -> Self {
        self.config.partition.resource_limit = limit;
        self
    }

    pub fn size_limit(mut self, limit: usize) -> Self {
        self.config.partition.size_limit = limit;
        self
    }

    pub fn capacity_policy(mut self, policy: CapacityPolicy) -> Self {
        self.config.partition.capacity_policy = policy;
        self
    }

    pub fn slots_per_cycle(mut self, slots: usize) -> Self {
        self.config.schedule.slots_per_cycle = slots;
        self
    }

    pub fn offset_scale(mut self, scale: u64) -> Self {
        self.config.schedule.offset_scale = scale;
        self
    }

    pub fn node(mut self, id: NodeId, resource: u64) -> Self {
        self.config.node.push(NodeConfig { id, resource });
        self
    }

    pub fn edge(mut self, from: NodeId, to: NodeId, bitwidth: u64, delay: u64) -> Self {
        self.config.edge.push(EdgeConfig {
            from,
            to,
            bitwidth,
            delay,
        });
        self
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Edges of the eight-node running example: four sources feeding four sinks.
pub const PAPER_EDGES: [(NodeId, NodeId); 12] = [
    (1, 5),
    (2, 5),
    (1, 6),
    (2, 6),
    (3, 6),
    (4, 6),
    (1, 7),
    (2, 7),
    (3, 7),
    (4, 7),
    (3, 8),
    (4, 8),
];

/// The eight-node running example with fixed demands, bitwidths and delays.
pub fn paper_example() -> Graph {
    let resources = [45, 60, 30, 70, 25, 55, 40, 35];
    let bitwidths = [12, 40, 8, 33, 17, 5, 61, 22, 9, 48, 27, 14];
    let delays = [1, 3, 2, 5, 1, 4, 2, 1, 3, 2, 5, 1];

    let mut builder = GraphBuilder::new();
    for (i, resource) in resources.into_iter().enumerate() {
        builder = builder.node(i as NodeId + 1, resource);
    }
    for (i, (from, to)) in PAPER_EDGES.into_iter().enumerate() {
        builder = builder.edge(from, to, bitwidths[i], delays[i]);
    }
    builder.build()
}
