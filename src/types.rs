// src/types.rs

//! Small shared types used across the graph, partition and schedule layers.

use std::str::FromStr;

use serde::Deserialize;

/// Identifier of a node in the task graph.
pub type NodeId = u32;

/// Index of a group in a [`crate::dag::Partitioning`].
///
/// Ids are dense (`0..len`) and get compacted whenever a group empties, so an
/// id is only meaningful against the partitioning it was read from.
pub type PartitionId = usize;

/// What to do when a group still exceeds `resource_limit` after refinement.
///
/// - `Warn`: log the offending groups and return them in the outcome
///   (default behaviour).
/// - `Error`: fail the run with [`crate::errors::PlanError::CapacityViolation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityPolicy {
    Warn,
    Error,
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        CapacityPolicy::Warn
    }
}

impl FromStr for CapacityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "warn" | "warning" => Ok(CapacityPolicy::Warn),
            "error" => Ok(CapacityPolicy::Error),
            other => Err(format!(
                "invalid capacity_policy: {other} (expected \"warn\" or \"error\")"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_policy_parses_case_insensitively() {
        assert_eq!("WARN".parse::<CapacityPolicy>(), Ok(CapacityPolicy::Warn));
        assert_eq!(" error ".parse::<CapacityPolicy>(), Ok(CapacityPolicy::Error));
        assert!("drop".parse::<CapacityPolicy>().is_err());
    }
}
