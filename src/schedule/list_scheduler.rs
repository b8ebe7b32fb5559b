// src/schedule/list_scheduler.rs

use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, info, warn};

use crate::dag::{Graph, Partitioning};
use crate::errors::{PlanError, Result, Stage};
use crate::schedule::offsets::{partition_offsets, partition_orders};
use crate::schedule::{Schedule, ScheduleConfig, Timestamps};
use crate::types::NodeId;

/// Per-run bookkeeping of the cycle loop.
#[derive(Debug)]
struct RunState {
    /// Predecessors of each node that have not been scheduled yet.
    remaining: BTreeMap<NodeId, usize>,
    /// Nodes whose predecessors are all scheduled, in the order they became
    /// ready. May still hold nodes the partition phase already placed.
    ready: VecDeque<NodeId>,
    /// Read position into each group's order.
    cursors: Vec<usize>,
    timestamps: BTreeMap<NodeId, Timestamps>,
}

impl RunState {
    fn is_scheduled(&self, id: NodeId) -> bool {
        self.timestamps.contains_key(&id)
    }
}

/// Resource-constrained list scheduler over a partitioned graph.
///
/// Each cycle first walks the groups in index order, taking at most one node
/// from each group whose offset has been reached. Spare slots are then
/// filled from the global ready queue.
#[derive(Debug)]
pub struct ListScheduler<'a> {
    graph: &'a Graph,
    partitioning: &'a Partitioning,
    config: ScheduleConfig,
}

impl<'a> ListScheduler<'a> {
    pub fn new(graph: &'a Graph, partitioning: &'a Partitioning, config: ScheduleConfig) -> Self {
        Self {
            graph,
            partitioning,
            config,
        }
    }

    pub fn run(&self) -> Result<Schedule> {
        self.config.validate()?;
        self.partitioning.check_cover(self.graph)?;

        let orders = partition_orders(self.graph, self.partitioning);
        let offsets = partition_offsets(self.graph, self.partitioning, self.config.offset_scale)?;

        let remaining: BTreeMap<NodeId, usize> = self
            .graph
            .nodes()
            .map(|n| (n.id, self.graph.predecessors(n.id).len()))
            .collect();
        let ready = remaining
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(id, _)| *id)
            .collect();

        let mut state = RunState {
            remaining,
            ready,
            cursors: vec![0; orders.len()],
            timestamps: BTreeMap::new(),
        };
        let mut cycles: Vec<Vec<NodeId>> = Vec::new();
        let mut cycle: u64 = 0;
        let mut attempted = 0;

        loop {
            self.skip_scheduled(&mut state, &orders);
            let cursors_done = state
                .cursors
                .iter()
                .zip(&orders)
                .all(|(cursor, order)| *cursor >= order.len());
            if state.ready.is_empty() && cursors_done {
                break;
            }

            if attempted >= self.config.max_cycles {
                warn!(
                    cycle,
                    scheduled = state.timestamps.len(),
                    total = self.graph.node_count(),
                    "list scheduling hit its cycle ceiling"
                );
                return Err(PlanError::NonConvergence {
                    stage: Stage::Scheduling,
                    limit: self.config.max_cycles,
                });
            }
            attempted += 1;

            let mut slot: Vec<NodeId> = Vec::new();

            // Partition-ordered phase.
            for (pid, order) in orders.iter().enumerate() {
                if slot.len() >= self.config.slots_per_cycle {
                    break;
                }
                let offset = offsets[pid];
                if cycle < offset {
                    continue;
                }
                let Some(&candidate) = order.get(state.cursors[pid]) else {
                    continue;
                };
                if !self.predecessors_done(&state, candidate) {
                    continue;
                }

                let input = self.input_time(&state, candidate, cycle, offset)?;
                self.place(&mut state, &mut slot, candidate, input, cycle)?;
                state.cursors[pid] += 1;
            }

            // Overflow drain.
            while slot.len() < self.config.slots_per_cycle {
                let Some(id) = state.ready.pop_front() else {
                    break;
                };
                if state.is_scheduled(id) || !self.predecessors_done(&state, id) {
                    continue;
                }

                let offset = self
                    .partitioning
                    .partition_of(id)
                    .and_then(|pid| offsets.get(pid).copied())
                    .unwrap_or(0);
                let input = self.input_time(&state, id, cycle, offset)?;
                self.place(&mut state, &mut slot, id, input, cycle)?;
            }

            if !slot.is_empty() {
                cycles.push(slot);
            }
            cycle += 1;
        }

        if state.timestamps.len() != self.graph.node_count() {
            warn!(
                scheduled = state.timestamps.len(),
                total = self.graph.node_count(),
                "scheduling stalled with nodes left over"
            );
            return Err(PlanError::NonConvergence {
                stage: Stage::Scheduling,
                limit: self.config.max_cycles,
            });
        }

        let schedule = Schedule {
            cycles,
            timestamps: state.timestamps,
            offsets,
        };
        info!(
            cycles = schedule.cycles.len(),
            makespan = schedule.makespan(),
            "list scheduling complete"
        );
        Ok(schedule)
    }

    /// Move each cursor past nodes already placed by the overflow drain and
    /// drop scheduled nodes from the head of the ready queue.
    fn skip_scheduled(&self, state: &mut RunState, orders: &[Vec<NodeId>]) {
        for (pid, order) in orders.iter().enumerate() {
            while let Some(&id) = order.get(state.cursors[pid]) {
                if !state.is_scheduled(id) {
                    break;
                }
                state.cursors[pid] += 1;
            }
        }
        while let Some(&id) = state.ready.front() {
            if !state.is_scheduled(id) {
                break;
            }
            state.ready.pop_front();
        }
    }

    fn predecessors_done(&self, state: &RunState, id: NodeId) -> bool {
        self.graph
            .predecessors(id)
            .iter()
            .all(|p| state.is_scheduled(*p))
    }

    /// τ_i: latest predecessor output plus edge delay (or the current cycle
    /// for a source node), never earlier than the group offset.
    fn input_time(&self, state: &RunState, id: NodeId, cycle: u64, offset: u64) -> Result<u64> {
        let mut arrival = cycle;
        let preds = self.graph.predecessors(id);
        if !preds.is_empty() {
            arrival = 0;
            for &p in preds {
                let output = state.timestamps.get(&p).map_or(0, |t| t.output);
                let delay = self.graph.edge(p, id).map_or(0, |e| e.delay);
                let ready_at = output
                    .checked_add(delay)
                    .ok_or_else(|| overflow(id, "edge delay"))?;
                arrival = arrival.max(ready_at);
            }
        }
        Ok(arrival.max(offset))
    }

    fn place(
        &self,
        state: &mut RunState,
        slot: &mut Vec<NodeId>,
        id: NodeId,
        input: u64,
        cycle: u64,
    ) -> Result<()> {
        let output = input
            .checked_add(self.config.node_execution_delay)
            .ok_or_else(|| overflow(id, "node_execution_delay"))?;
        state.timestamps.insert(id, Timestamps { input, output });
        slot.push(id);
        debug!(node = id, cycle, tau_i = input, tau_o = output, "scheduled node");

        for &succ in self.graph.successors(id) {
            if let Some(count) = state.remaining.get_mut(&succ) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    state.ready.push_back(succ);
                }
            }
        }
        Ok(())
    }
}

fn overflow(id: NodeId, what: &str) -> PlanError {
    PlanError::Config(format!("timestamp of node {id} overflows u64 after adding {what}"))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::dag::{Edge, Node};

    fn graph(n: u32, edges: &[(NodeId, NodeId, u64)]) -> Graph {
        let mut g = Graph::new();
        for id in 1..=n {
            g.add_node(Node { id, resource: 1 }).unwrap();
        }
        for &(from, to, delay) in edges {
            g.add_edge(Edge {
                from,
                to,
                bitwidth: 1,
                delay,
            })
            .unwrap();
        }
        g
    }

    fn split(g: &Graph, sets: &[&[NodeId]]) -> Partitioning {
        let groups: Vec<BTreeSet<NodeId>> =
            sets.iter().map(|s| s.iter().copied().collect()).collect();
        Partitioning::from_groups(g, groups).unwrap()
    }

    fn config(slots: usize) -> ScheduleConfig {
        ScheduleConfig {
            slots_per_cycle: slots,
            node_execution_delay: 1,
            offset_scale: 10,
            max_cycles: 1000,
        }
    }

    #[test]
    fn chain_in_one_group_accumulates_delays() {
        let g = graph(3, &[(1, 2, 2), (2, 3, 0)]);
        let p = split(&g, &[&[1, 2, 3]]);
        let s = ListScheduler::new(&g, &p, config(1)).run().unwrap();

        assert_eq!(s.cycles, vec![vec![1], vec![2], vec![3]]);
        assert_eq!(s.timestamps[&1], Timestamps { input: 0, output: 1 });
        assert_eq!(s.timestamps[&2], Timestamps { input: 3, output: 4 });
        assert_eq!(s.timestamps[&3], Timestamps { input: 4, output: 5 });
        assert_eq!(s.makespan(), 5);
        assert_eq!(s.cycle_of(3), Some(2));
        assert_eq!(s.cycle_of(9), None);
    }

    #[test]
    fn timestamp_overflow_is_a_config_error() {
        let g = graph(2, &[(1, 2, 0)]);
        let p = split(&g, &[&[1, 2]]);
        let cfg = ScheduleConfig {
            node_execution_delay: u64::MAX,
            ..config(1)
        };

        match ListScheduler::new(&g, &p, cfg).run() {
            Err(PlanError::Config(msg)) => assert!(msg.contains("node 2")),
            other => panic!("Expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn group_offset_floors_input_time() {
        let g = graph(2, &[(1, 2, 0)]);
        let p = split(&g, &[&[1], &[2]]);
        let s = ListScheduler::new(&g, &p, config(2)).run().unwrap();

        assert_eq!(s.offsets, vec![0, 10]);
        assert_eq!(s.timestamps[&2].input, 10);
    }

    #[test]
    fn drained_node_is_not_scheduled_twice() {
        // Two independent nodes in one group, two slots: the group phase takes
        // 1, the drain takes 2; the group cursor must then skip 2.
        let g = graph(2, &[]);
        let p = split(&g, &[&[1, 2]]);
        let s = ListScheduler::new(&g, &p, config(2)).run().unwrap();

        assert_eq!(s.cycles, vec![vec![1, 2]]);
        assert_eq!(s.timestamps.len(), 2);
    }

    #[test]
    fn slots_cap_each_cycle() {
        let g = graph(5, &[]);
        let p = split(&g, &[&[1, 2], &[3, 4], &[5]]);
        let s = ListScheduler::new(&g, &p, config(2)).run().unwrap();

        assert!(s.cycles.iter().all(|c| c.len() <= 2));
        assert_eq!(s.cycles.iter().map(|c| c.len()).sum::<usize>(), 5);
    }

    #[test]
    fn cycle_ceiling_reports_non_convergence() {
        let g = graph(3, &[]);
        let p = split(&g, &[&[1, 2, 3]]);
        let cfg = ScheduleConfig {
            max_cycles: 1,
            ..config(1)
        };
        let err = ListScheduler::new(&g, &p, cfg).run().unwrap_err();
        assert!(matches!(
            err,
            PlanError::NonConvergence {
                stage: Stage::Scheduling,
                limit: 1
            }
        ));
    }
}
