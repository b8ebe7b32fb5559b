// src/config/model.rs

use serde::Deserialize;

use crate::dag::Graph;
use crate::partition::PartitionConfig;
use crate::schedule::ScheduleConfig;
use crate::types::{CapacityPolicy, NodeId};
use crate::PlanConfig;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [partition]
/// resource_limit = 150
/// size_limit = 4
///
/// [schedule]
/// slots_per_cycle = 2
/// offset_scale = 10
///
/// [[node]]
/// id = 1
/// resource = 40
///
/// [[node]]
/// id = 5
/// resource = 25
///
/// [[edge]]
/// from = 1
/// to = 5
/// bitwidth = 8
/// delay = 2
/// ```
///
/// All sections are optional and have defaults; an empty file is a valid
/// (empty) graph.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub partition: PartitionSection,

    #[serde(default)]
    pub schedule: ScheduleSection,

    /// All `[[node]]` entries.
    #[serde(default)]
    pub node: Vec<NodeConfig>,

    /// All `[[edge]]` entries, in file order.
    #[serde(default)]
    pub edge: Vec<EdgeConfig>,
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>`, which checks the limits
/// and builds an acyclic [`Graph`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub partition: PartitionSection,
    pub schedule: ScheduleSection,
    graph: Graph,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        partition: PartitionSection,
        schedule: ScheduleSection,
        graph: Graph,
    ) -> Self {
        Self {
            partition,
            schedule,
            graph,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn partition_config(&self) -> PartitionConfig {
        PartitionConfig {
            resource_limit: self.partition.resource_limit,
            size_limit: self.partition.size_limit,
            max_sweeps: self.partition.max_sweeps,
            capacity_policy: self.partition.capacity_policy,
        }
    }

    pub fn schedule_config(&self) -> ScheduleConfig {
        ScheduleConfig {
            slots_per_cycle: self.schedule.slots_per_cycle,
            node_execution_delay: self.schedule.node_execution_delay,
            offset_scale: self.schedule.offset_scale,
            max_cycles: self.schedule.max_cycles,
        }
    }

    pub fn plan_config(&self) -> PlanConfig {
        PlanConfig {
            partition: self.partition_config(),
            schedule: self.schedule_config(),
        }
    }
}

/// `[partition]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PartitionSection {
    /// Capacity units available to one group.
    #[serde(default = "default_resource_limit")]
    pub resource_limit: u64,

    /// Maximum nodes per group.
    #[serde(default = "default_size_limit")]
    pub size_limit: usize,

    #[serde(default = "default_max_sweeps")]
    pub max_sweeps: usize,

    /// `"warn"` (default) or `"error"`.
    #[serde(default)]
    pub capacity_policy: CapacityPolicy,
}

fn default_resource_limit() -> u64 {
    150
}

fn default_size_limit() -> usize {
    4
}

fn default_max_sweeps() -> usize {
    64
}

impl Default for PartitionSection {
    fn default() -> Self {
        Self {
            resource_limit: default_resource_limit(),
            size_limit: default_size_limit(),
            max_sweeps: default_max_sweeps(),
            capacity_policy: CapacityPolicy::default(),
        }
    }
}

/// `[schedule]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleSection {
    /// Nodes that may be issued in one cycle.
    #[serde(default = "default_slots_per_cycle")]
    pub slots_per_cycle: usize,

    #[serde(default = "default_node_execution_delay")]
    pub node_execution_delay: u64,

    /// Cycles per quotient level (reconfiguration latency).
    #[serde(default = "default_offset_scale")]
    pub offset_scale: u64,

    #[serde(default = "default_max_cycles")]
    pub max_cycles: usize,
}

fn default_slots_per_cycle() -> usize {
    2
}

fn default_node_execution_delay() -> u64 {
    1
}

fn default_offset_scale() -> u64 {
    10
}

fn default_max_cycles() -> usize {
    1000
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            slots_per_cycle: default_slots_per_cycle(),
            node_execution_delay: default_node_execution_delay(),
            offset_scale: default_offset_scale(),
            max_cycles: default_max_cycles(),
        }
    }
}

/// `[[node]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    pub id: NodeId,
    pub resource: u64,
}

/// `[[edge]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeConfig {
    pub from: NodeId,
    pub to: NodeId,
    pub bitwidth: u64,
    #[serde(default)]
    pub delay: u64,
}
