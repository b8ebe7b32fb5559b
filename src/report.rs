// src/report.rs

//! Plain-text report of a plan, printed to stdout by the CLI.

use std::fmt;

use tracing::debug;

use crate::config::ConfigFile;
use crate::dag::Graph;
use crate::{PlanConfig, PlanOutput};

/// Partitions, cut history, cycle listing and timestamps of one plan.
pub struct PlanReport<'a> {
    pub graph: &'a Graph,
    pub config: &'a PlanConfig,
    pub output: &'a PlanOutput,
}

impl PlanReport<'_> {
    fn write_partitions(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let partition = &self.output.partition;
        let limit = self.config.partition.resource_limit;

        writeln!(f, "partitions ({}):", partition.partitioning.len())?;
        let resources = partition.resources(self.graph);
        for (pid, (group, resource)) in partition.partitioning.groups().iter().zip(resources).enumerate()
        {
            let nodes: Vec<_> = group.iter().collect();
            let offset = self.output.schedule.offsets.get(pid).copied().unwrap_or(0);
            writeln!(
                f,
                "  partition {pid}: nodes={nodes:?} resource={resource}/{limit} offset={offset}"
            )?;
        }
        for v in &partition.violations {
            writeln!(f, "  warning: {v}")?;
        }

        writeln!(f)?;
        writeln!(f, "cut cost: {}", partition.cut_cost())?;
        writeln!(
            f,
            "cut history ({} sweeps): {:?}",
            partition.sweeps, partition.cut_history
        )?;
        if partition.diverged {
            writeln!(f, "  warning: a sweep increased the cut; best state kept")?;
        }
        writeln!(f, "moves accepted: {}", partition.moves.len())
    }

    fn write_schedule(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let schedule = &self.output.schedule;

        writeln!(f, "schedule ({} cycles):", schedule.cycles.len())?;
        for (cycle, nodes) in schedule.cycles.iter().enumerate() {
            writeln!(f, "  cycle {cycle}: {nodes:?}")?;
        }

        writeln!(f)?;
        writeln!(f, "timestamps:")?;
        for (id, t) in &schedule.timestamps {
            writeln!(f, "  node {id}: tau_i = {}, tau_o = {}", t.input, t.output)?;
        }
        writeln!(f, "makespan: {}", schedule.makespan())
    }
}

impl fmt::Display for PlanReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_partitions(f)?;
        writeln!(f)?;
        self.write_schedule(f)
    }
}

pub fn render_plan(graph: &Graph, config: &PlanConfig, output: &PlanOutput) -> String {
    PlanReport {
        graph,
        config,
        output,
    }
    .to_string()
}

pub fn print_plan(graph: &Graph, config: &PlanConfig, output: &PlanOutput) {
    print!("{}", render_plan(graph, config, output));
}

/// Simple dry-run output: limits, nodes and edges.
pub fn print_dry_run(cfg: &ConfigFile) {
    println!("reusedag dry-run");
    println!(
        "  partition.resource_limit = {}",
        cfg.partition.resource_limit
    );
    println!("  partition.size_limit = {}", cfg.partition.size_limit);
    println!("  partition.max_sweeps = {}", cfg.partition.max_sweeps);
    println!(
        "  partition.capacity_policy = {:?}",
        cfg.partition.capacity_policy
    );
    println!(
        "  schedule.slots_per_cycle = {}",
        cfg.schedule.slots_per_cycle
    );
    println!(
        "  schedule.node_execution_delay = {}",
        cfg.schedule.node_execution_delay
    );
    println!("  schedule.offset_scale = {}", cfg.schedule.offset_scale);
    println!("  schedule.max_cycles = {}", cfg.schedule.max_cycles);
    println!();

    let graph = cfg.graph();
    println!("nodes ({}):", graph.node_count());
    for node in graph.nodes() {
        println!("  - {} (resource {})", node.id, node.resource);
    }
    println!("edges ({}):", graph.edge_count());
    for edge in graph.edges() {
        println!(
            "  - {} -> {} (bitwidth {}, delay {})",
            edge.from, edge.to, edge.bitwidth, edge.delay
        );
    }

    debug!("dry-run complete (nothing planned)");
}
