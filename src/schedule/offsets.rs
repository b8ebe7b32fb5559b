// src/schedule/offsets.rs

//! Per-group execution order and start offsets.

use tracing::{debug, warn};

use crate::dag::{Graph, Partitioning};
use crate::errors::{PlanError, Result};
use crate::types::NodeId;

/// Topological order of each group, using only edges inside the group.
///
/// A group whose induced order comes back empty falls back to its member list
/// in ascending id order.
pub fn partition_orders(graph: &Graph, partitioning: &Partitioning) -> Vec<Vec<NodeId>> {
    partitioning
        .groups()
        .iter()
        .map(|group| {
            let order = graph.subgraph_order(group);
            if order.is_empty() {
                group.iter().copied().collect()
            } else {
                order
            }
        })
        .collect()
}

/// Earliest cycle at which each group may start: its longest hop distance
/// from a source group in the quotient graph, times `offset_scale`.
///
/// Fails with [`PlanError::Config`] if an offset does not fit in a `u64`.
pub fn partition_offsets(
    graph: &Graph,
    partitioning: &Partitioning,
    offset_scale: u64,
) -> Result<Vec<u64>> {
    let quotient = partitioning.quotient(graph);
    if !quotient.is_acyclic() {
        warn!("quotient graph is cyclic; every partition offset falls back to 0");
    }

    let offsets = quotient
        .levels()
        .into_iter()
        .map(|level| {
            (level as u64).checked_mul(offset_scale).ok_or_else(|| {
                PlanError::Config(format!(
                    "schedule offset_scale {offset_scale} overflows at partition level {level}"
                ))
            })
        })
        .collect::<Result<Vec<u64>>>()?;
    debug!(?offsets, "partition offsets");
    Ok(offsets)
}
