#[path = "../common/mod.rs"]
mod common;

use std::collections::BTreeSet;

use proptest::prelude::*;
use reusedag::dag::Graph;
use reusedag::partition::PartitionConfig;
use reusedag::schedule::ScheduleConfig;
use reusedag::{plan, PlanConfig};

use crate::common::builders::GraphBuilder;
use crate::common::{assert_moves_replay, assert_schedule_valid, init_tracing};

const RESOURCE_LIMIT: u64 = 100;

// Acyclicity comes from only drawing edges from a lower to a higher id.
fn dag_strategy(max_nodes: usize) -> impl Strategy<Value = Graph> {
    (1..=max_nodes).prop_flat_map(|n| {
        let resources = proptest::collection::vec(1..=RESOURCE_LIMIT, n);
        let edges = proptest::collection::vec(
            (any::<usize>(), any::<usize>(), 1..64u64, 0..6u64),
            0..(n * 2),
        );

        (resources, edges).prop_map(move |(resources, raw_edges)| {
            let mut builder = GraphBuilder::new();
            for (i, resource) in resources.into_iter().enumerate() {
                builder = builder.node(i as u32 + 1, resource);
            }

            let mut seen = BTreeSet::new();
            for (a, b, bitwidth, delay) in raw_edges {
                let (a, b) = (a % n, b % n);
                if a == b {
                    continue;
                }
                let (from, to) = (a.min(b) as u32 + 1, a.max(b) as u32 + 1);
                if seen.insert((from, to)) {
                    builder = builder.edge(from, to, bitwidth, delay);
                }
            }
            builder.build()
        })
    })
}

fn config_strategy() -> impl Strategy<Value = PlanConfig> {
    (1..=5usize, 1..=3usize, 1..=3u64, 0..=10u64).prop_map(
        |(size_limit, slots_per_cycle, node_execution_delay, offset_scale)| PlanConfig {
            partition: PartitionConfig {
                resource_limit: RESOURCE_LIMIT,
                size_limit,
                ..PartitionConfig::default()
            },
            schedule: ScheduleConfig {
                slots_per_cycle,
                node_execution_delay,
                offset_scale,
                ..ScheduleConfig::default()
            },
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn plan_holds_partition_and_schedule_invariants(
        graph in dag_strategy(12),
        config in config_strategy(),
    ) {
        init_tracing();
        let output = plan(&graph, &config).unwrap();
        let outcome = &output.partition;

        outcome.partitioning.check_cover(&graph).unwrap();
        // Lone nodes never leave their group, so no group is ever compacted.
        prop_assert_eq!(outcome.partitioning.len(), outcome.initial.len());
        prop_assert!(outcome.partitioning.quotient(&graph).is_acyclic());
        for group in outcome.partitioning.groups() {
            prop_assert!(group.len() <= config.partition.size_limit);
        }
        assert_moves_replay(&graph, outcome);

        if !outcome.diverged {
            for pair in outcome.cut_history.windows(2) {
                prop_assert!(pair[1] <= pair[0], "cut rose: {:?}", outcome.cut_history);
            }
        }
        prop_assert!(outcome.cut_cost() <= outcome.cut_history[0]);

        // Over-capacity groups only arise from refinement and must be reported.
        for (pid, resource) in outcome.resources(&graph).into_iter().enumerate() {
            if resource > RESOURCE_LIMIT {
                prop_assert!(outcome.violations.iter().any(|v| v.partition == pid));
            }
        }

        assert_schedule_valid(
            &graph,
            outcome,
            &output.schedule,
            config.schedule.slots_per_cycle,
            config.schedule.node_execution_delay,
        );
    }

    #[test]
    fn derived_views_are_stable_across_recomputation(graph in dag_strategy(12)) {
        let order = graph.topological_order().unwrap();
        prop_assert_eq!(&order, &graph.topological_order().unwrap());
        prop_assert_eq!(order.len(), graph.node_count());

        let output = plan(&graph, &PlanConfig::default()).unwrap();
        let partitioning = &output.partition.partitioning;
        prop_assert_eq!(partitioning.quotient(&graph), partitioning.quotient(&graph));

        let again = plan(&graph, &PlanConfig::default()).unwrap();
        prop_assert_eq!(&again.partition.partitioning, partitioning);
        prop_assert_eq!(&again.schedule, &output.schedule);
    }
}
