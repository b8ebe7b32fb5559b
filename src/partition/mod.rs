// src/partition/mod.rs

//! Partition engine: split the task graph into resource-bounded groups while
//! keeping the group-level (quotient) graph acyclic.
//!
//! The heavy lifting lives in [`engine`]; this module holds the configuration
//! and the result types handed to the scheduler and the report.

pub mod engine;

pub use engine::Partitioner;

use crate::dag::{Graph, Partitioning};
use crate::errors::{CapacityViolation, PlanError, Result};
use crate::types::{CapacityPolicy, NodeId, PartitionId};

/// Limits for one partitioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionConfig {
    /// Maximum total resource demand per group.
    pub resource_limit: u64,
    /// Maximum number of nodes per group.
    pub size_limit: usize,
    /// Refinement sweeps allowed before giving up with a convergence error.
    pub max_sweeps: usize,
    pub capacity_policy: CapacityPolicy,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            resource_limit: 150,
            size_limit: 4,
            max_sweeps: 64,
            capacity_policy: CapacityPolicy::Warn,
        }
    }
}

impl PartitionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.resource_limit == 0 {
            return Err(PlanError::Config(
                "partition resource_limit must be >= 1 (got 0)".to_string(),
            ));
        }
        if self.size_limit == 0 {
            return Err(PlanError::Config(
                "partition size_limit must be >= 1 (got 0)".to_string(),
            ));
        }
        if self.max_sweeps == 0 {
            return Err(PlanError::Config(
                "partition max_sweeps must be >= 1 (got 0)".to_string(),
            ));
        }
        Ok(())
    }
}

/// One accepted refinement move.
///
/// `from` and `to` are group ids as they were *before* the move, so replaying
/// `move_node(node, to)` on a copy of the previous partitioning reproduces the
/// step exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub node: NodeId,
    pub from: PartitionId,
    pub to: PartitionId,
    /// Cut cost right after the move.
    pub cut_after: u64,
}

/// Everything a partitioning run produces.
#[derive(Debug, Clone)]
pub struct PartitionOutcome {
    /// Final groups.
    pub partitioning: Partitioning,
    /// Groups straight out of initial placement, before any move.
    pub initial: Partitioning,
    /// Initial cut cost followed by the cost after each sweep.
    pub cut_history: Vec<u64>,
    /// Accepted moves in application order.
    pub moves: Vec<MoveRecord>,
    pub sweeps: usize,
    /// A sweep raised the cut; `partitioning` is the best state seen before it.
    pub diverged: bool,
    /// Groups still over `resource_limit` (only non-empty under
    /// [`CapacityPolicy::Warn`]).
    pub violations: Vec<CapacityViolation>,
}

impl PartitionOutcome {
    /// Cut cost of the final partitioning.
    pub fn cut_cost(&self) -> u64 {
        match self.moves.last() {
            Some(last) => last.cut_after,
            None => self.cut_history.first().copied().unwrap_or(0),
        }
    }

    /// Resource demand of each final group.
    pub fn resources(&self, graph: &Graph) -> Vec<u64> {
        self.partitioning.resources(graph)
    }
}

/// Run the partition engine on `graph`.
pub fn partition(graph: &Graph, config: &PartitionConfig) -> Result<PartitionOutcome> {
    Partitioner::new(graph, *config).run()
}
