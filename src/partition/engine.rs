// src/partition/engine.rs

//! Initial placement and greedy refinement.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::dag::{Graph, Partitioning};
use crate::errors::{CapacityViolation, PlanError, Result, Stage};
use crate::partition::{MoveRecord, PartitionConfig, PartitionOutcome};
use crate::types::{CapacityPolicy, NodeId, PartitionId};

/// Mutable state threaded through refinement sweeps.
#[derive(Debug, Clone)]
struct RefineState {
    partitioning: Partitioning,
    cost: u64,
    moves: Vec<MoveRecord>,
}

/// Partition engine bound to one graph and one configuration.
///
/// The graph is only read. All per-run state lives in [`RefineState`] and is
/// handed back inside the [`PartitionOutcome`].
#[derive(Debug)]
pub struct Partitioner<'g> {
    graph: &'g Graph,
    config: PartitionConfig,
}

impl<'g> Partitioner<'g> {
    pub fn new(graph: &'g Graph, config: PartitionConfig) -> Self {
        Self { graph, config }
    }

    /// Place, refine until a sweep leaves the cut unchanged, then check
    /// capacity.
    pub fn run(&self) -> Result<PartitionOutcome> {
        self.config.validate()?;
        self.check_feasible()?;

        let initial = self.initial_placement()?;
        let initial_cost = initial.cut_cost(self.graph);
        info!(
            partitions = initial.len(),
            cut = initial_cost,
            "initial topological placement complete"
        );

        let mut state = RefineState {
            partitioning: initial.clone(),
            cost: initial_cost,
            moves: Vec::new(),
        };
        let mut cut_history = vec![initial_cost];
        let mut best = state.clone();
        let mut previous = initial_cost;
        let mut sweeps = 0;
        let mut diverged = false;

        loop {
            if sweeps >= self.config.max_sweeps {
                warn!(
                    sweeps,
                    best_cut = best.cost,
                    "refinement hit its sweep ceiling"
                );
                return Err(PlanError::NonConvergence {
                    stage: Stage::Refinement,
                    limit: self.config.max_sweeps,
                });
            }
            sweeps += 1;

            let cost = self.sweep(&mut state)?;
            cut_history.push(cost);

            if cost == previous {
                info!(sweep = sweeps, cut = cost, "refinement converged");
                break;
            }
            if cost > best.cost {
                warn!(
                    sweep = sweeps,
                    cut = cost,
                    best_cut = best.cost,
                    "cut cost increased; keeping best partitioning seen"
                );
                diverged = true;
                state = best.clone();
                break;
            }

            info!(
                sweep = sweeps,
                cut = cost,
                improvement = previous - cost,
                "refinement sweep improved cut"
            );
            best = state.clone();
            previous = cost;
        }

        let violations = self.capacity_violations(&state.partitioning);
        if !violations.is_empty() {
            for v in &violations {
                warn!(
                    partition = v.partition,
                    resource = v.resource,
                    limit = v.limit,
                    "partition exceeds resource_limit after refinement"
                );
            }
            if self.config.capacity_policy == CapacityPolicy::Error {
                return Err(PlanError::CapacityViolation(violations));
            }
        }

        Ok(PartitionOutcome {
            partitioning: state.partitioning,
            initial,
            cut_history,
            moves: state.moves,
            sweeps,
            diverged,
            violations,
        })
    }

    /// Every node must fit on its own, otherwise no placement exists.
    fn check_feasible(&self) -> Result<()> {
        let limit = self.config.resource_limit;
        match self.graph.nodes().find(|n| n.resource > limit) {
            Some(node) => Err(PlanError::InfeasiblePartition {
                node: node.id,
                demand: node.resource,
                limit,
            }),
            None => Ok(()),
        }
    }

    /// Fill groups greedily in topological order.
    ///
    /// A group is closed when the next node would push it past
    /// `resource_limit` or past `size_limit` members. Since nodes arrive in
    /// topological order, every crossing edge points to a later group and the
    /// quotient graph starts out acyclic.
    pub fn initial_placement(&self) -> Result<Partitioning> {
        let order = self.graph.topological_order()?;
        let mut groups: Vec<BTreeSet<NodeId>> = Vec::new();
        let mut current: BTreeSet<NodeId> = BTreeSet::new();
        let mut current_resource = 0;

        for id in order {
            let resource = self.graph.resource_of(id);
            let over_resource =
                !current.is_empty() && current_resource + resource > self.config.resource_limit;
            let over_size = current.len() + 1 > self.config.size_limit;

            if over_resource || over_size {
                groups.push(std::mem::take(&mut current));
                current_resource = 0;
            }

            current.insert(id);
            current_resource += resource;
        }
        if !current.is_empty() {
            groups.push(current);
        }

        Partitioning::from_groups(self.graph, groups)
    }

    /// One pass over all groups. Returns the cut cost afterwards.
    fn sweep(&self, state: &mut RefineState) -> Result<u64> {
        let mut pid = 0;
        while pid < state.partitioning.len() {
            let groups_before = state.partitioning.len();
            let mut worklist = vec![pid];
            while let Some(current) = worklist.pop() {
                if let Some(dest) = self.scan(state, current)? {
                    worklist.push(dest);
                }
            }
            // After a compaction a different group sits at `pid`; scan it too.
            if state.partitioning.len() == groups_before {
                pid += 1;
            }
        }
        Ok(state.cost)
    }

    /// Try each member of `pid` (ascending id) against each other group
    /// (ascending index) and apply the first move that lowers the cut.
    ///
    /// A group with a single member is left alone, so refinement never
    /// dissolves a group.
    ///
    /// Returns the destination group of the applied move, if any.
    fn scan(&self, state: &mut RefineState, pid: PartitionId) -> Result<Option<PartitionId>> {
        let Some(group) = state.partitioning.group(pid) else {
            return Ok(None);
        };
        if group.len() == 1 {
            return Ok(None);
        }
        let members: Vec<NodeId> = group.iter().copied().collect();

        for node in members {
            for to in 0..state.partitioning.len() {
                if to == pid {
                    continue;
                }
                let target_len = state.partitioning.group(to).map_or(0, |g| g.len());
                if target_len + 1 > self.config.size_limit {
                    continue;
                }

                let reduction = self.cut_reduction(&state.partitioning, node, pid, to);
                if reduction <= 0 {
                    continue;
                }
                if !state
                    .partitioning
                    .quotient_with_move(self.graph, node, to)
                    .is_acyclic()
                {
                    continue;
                }

                let dest = state.partitioning.move_node(node, to)?;
                state.cost -= reduction as u64;
                state.moves.push(MoveRecord {
                    node,
                    from: pid,
                    to,
                    cut_after: state.cost,
                });
                debug!(node, from = pid, to = dest, cut = state.cost, "accepted move");

                let resource = state.partitioning.resource_of(self.graph, dest);
                if resource > self.config.resource_limit {
                    debug!(
                        partition = dest,
                        resource,
                        limit = self.config.resource_limit,
                        "destination over capacity; refining it further"
                    );
                }

                return Ok(Some(dest));
            }
        }

        Ok(None)
    }

    /// How much the cut drops if `node` moves from `from` to `to`.
    ///
    /// Only edges incident to `node` can change status; negative means the
    /// cut would grow.
    pub fn cut_reduction(
        &self,
        partitioning: &Partitioning,
        node: NodeId,
        from: PartitionId,
        to: PartitionId,
    ) -> i64 {
        let mut reduction: i64 = 0;

        for edge in self.graph.incident_edges(node) {
            let other = if edge.from == node { edge.to } else { edge.from };
            let Some(other_pid) = partitioning.partition_of(other) else {
                continue;
            };
            let weight = edge.bitwidth as i64;

            if other_pid != from && other_pid == to {
                reduction += weight;
            } else if other_pid == from && other_pid != to {
                reduction -= weight;
            }
        }

        reduction
    }

    fn capacity_violations(&self, partitioning: &Partitioning) -> Vec<CapacityViolation> {
        partitioning
            .resources(self.graph)
            .into_iter()
            .enumerate()
            .filter(|(_, resource)| *resource > self.config.resource_limit)
            .map(|(partition, resource)| CapacityViolation {
                partition,
                resource,
                limit: self.config.resource_limit,
            })
            .collect()
    }
}
