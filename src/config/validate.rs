// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::dag::{Edge, Graph, Node};
use crate::errors::{PlanError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::PlanError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_limits(&raw)?;
        validate_weights(&raw)?;
        let graph = build_graph(&raw)?;
        graph.ensure_acyclic()?;
        Ok(ConfigFile::new_unchecked(raw.partition, raw.schedule, graph))
    }
}

fn validate_limits(cfg: &RawConfigFile) -> Result<()> {
    let limits = [
        ("[partition].resource_limit", cfg.partition.resource_limit),
        ("[partition].size_limit", cfg.partition.size_limit as u64),
        ("[partition].max_sweeps", cfg.partition.max_sweeps as u64),
        ("[schedule].slots_per_cycle", cfg.schedule.slots_per_cycle as u64),
        ("[schedule].max_cycles", cfg.schedule.max_cycles as u64),
    ];

    for (name, value) in limits {
        if value == 0 {
            return Err(PlanError::Config(format!("{name} must be >= 1 (got 0)")));
        }
    }
    Ok(())
}

fn validate_weights(cfg: &RawConfigFile) -> Result<()> {
    for node in &cfg.node {
        if node.resource == 0 {
            return Err(PlanError::Config(format!(
                "node {} must have resource >= 1 (got 0)",
                node.id
            )));
        }
    }
    for edge in &cfg.edge {
        if edge.bitwidth == 0 {
            return Err(PlanError::Config(format!(
                "edge {} -> {} must have bitwidth >= 1 (got 0)",
                edge.from, edge.to
            )));
        }
    }
    Ok(())
}

/// Duplicate ids, unknown endpoints, self-loops and duplicate pairs are
/// rejected by the graph itself.
fn build_graph(cfg: &RawConfigFile) -> Result<Graph> {
    let mut graph = Graph::new();

    for node in &cfg.node {
        graph.add_node(Node {
            id: node.id,
            resource: node.resource,
        })?;
    }
    for edge in &cfg.edge {
        graph.add_edge(Edge {
            from: edge.from,
            to: edge.to,
            bitwidth: edge.bitwidth,
            delay: edge.delay,
        })?;
    }

    Ok(graph)
}
