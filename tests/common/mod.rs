#![allow(dead_code)]

pub use reusedag_test_utils::builders;
pub use reusedag_test_utils::init_tracing;

use reusedag::dag::Graph;
use reusedag::partition::PartitionOutcome;
use reusedag::schedule::Schedule;

/// Replay every accepted move from the initial placement, checking that the
/// quotient stays acyclic and the recorded cut matches after each step.
pub fn assert_moves_replay(graph: &Graph, outcome: &PartitionOutcome) {
    let mut replay = outcome.initial.clone();
    assert!(replay.quotient(graph).is_acyclic(), "initial quotient is cyclic");

    for (step, mv) in outcome.moves.iter().enumerate() {
        assert_eq!(replay.partition_of(mv.node), Some(mv.from), "step {step}");
        replay.move_node(mv.node, mv.to).unwrap();
        assert!(
            replay.quotient(graph).is_acyclic(),
            "quotient cyclic after move {step}: {mv:?}"
        );
        assert_eq!(replay.cut_cost(graph), mv.cut_after, "step {step}");
        replay.check_cover(graph).unwrap();
    }

    assert_eq!(replay, outcome.partitioning);
}

/// Every node is issued once, τ_i respects predecessors and group offsets,
/// and no cycle issues more than `slots` nodes.
pub fn assert_schedule_valid(
    graph: &Graph,
    outcome: &PartitionOutcome,
    schedule: &Schedule,
    slots: usize,
    exec_delay: u64,
) {
    let issued: usize = schedule.cycles.iter().map(|c| c.len()).sum();
    assert_eq!(issued, graph.node_count());
    assert_eq!(schedule.timestamps.len(), graph.node_count());

    for cycle in &schedule.cycles {
        assert!(!cycle.is_empty());
        assert!(cycle.len() <= slots, "cycle over capacity: {cycle:?}");
    }

    for node in graph.nodes() {
        let t = schedule.timestamps[&node.id];
        assert_eq!(t.output, t.input + exec_delay);

        for &pred in graph.predecessors(node.id) {
            let delay = graph.edge(pred, node.id).unwrap().delay;
            assert!(
                t.input >= schedule.timestamps[&pred].output + delay,
                "node {} starts before predecessor {} is available",
                node.id,
                pred
            );
        }

        let pid = outcome.partitioning.partition_of(node.id).unwrap();
        assert!(t.input >= schedule.offsets[pid]);
    }
}
