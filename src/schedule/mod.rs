// src/schedule/mod.rs

//! Cycle-accurate list scheduling over a partitioned graph.
//!
//! - [`offsets`] derives per-group orders and start offsets from the
//!   quotient graph.
//! - [`list_scheduler`] runs the cycle loop.

pub mod list_scheduler;
pub mod offsets;

pub use list_scheduler::ListScheduler;
pub use offsets::{partition_offsets, partition_orders};

use std::collections::BTreeMap;

use crate::dag::{Graph, Partitioning};
use crate::errors::{PlanError, Result};
use crate::types::NodeId;

/// Parameters of the cycle loop.
///
/// `slots_per_cycle` bounds how many nodes may *start* in one cycle. It is
/// unrelated to the partitioner's `resource_limit`, which bounds the summed
/// demand of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub slots_per_cycle: usize,
    /// τ_o - τ_i for every node.
    pub node_execution_delay: u64,
    /// Cycles added per quotient level; models reconfiguration latency.
    pub offset_scale: u64,
    pub max_cycles: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            slots_per_cycle: 2,
            node_execution_delay: 1,
            offset_scale: 10,
            max_cycles: 1000,
        }
    }
}

impl ScheduleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.slots_per_cycle == 0 {
            return Err(PlanError::Config(
                "schedule slots_per_cycle must be >= 1 (got 0)".to_string(),
            ));
        }
        if self.max_cycles == 0 {
            return Err(PlanError::Config(
                "schedule max_cycles must be >= 1 (got 0)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input (τ_i) and output (τ_o) cycle of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    pub input: u64,
    pub output: u64,
}

/// Result of a scheduling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Nodes issued in each non-empty cycle, in issue order.
    pub cycles: Vec<Vec<NodeId>>,
    pub timestamps: BTreeMap<NodeId, Timestamps>,
    /// Start offset of each group, by partition id.
    pub offsets: Vec<u64>,
}

impl Schedule {
    /// τ_i of every node.
    pub fn input_times(&self) -> BTreeMap<NodeId, u64> {
        self.timestamps
            .iter()
            .map(|(id, t)| (*id, t.input))
            .collect()
    }

    /// Latest τ_o, or 0 for an empty schedule.
    pub fn makespan(&self) -> u64 {
        self.timestamps
            .values()
            .map(|t| t.output)
            .max()
            .unwrap_or(0)
    }

    /// Index into [`Schedule::cycles`] of the cycle that issued `id`.
    pub fn cycle_of(&self, id: NodeId) -> Option<usize> {
        self.cycles.iter().position(|c| c.contains(&id))
    }
}

/// Schedule `graph` under `partitioning`.
pub fn schedule(
    graph: &Graph,
    partitioning: &Partitioning,
    config: &ScheduleConfig,
) -> Result<Schedule> {
    ListScheduler::new(graph, partitioning, *config).run()
}
