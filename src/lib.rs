// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod logging;
pub mod partition;
pub mod report;
pub mod schedule;
pub mod types;

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader::load_from_path;
use crate::config::{ConfigFile, RawConfigFile};
use crate::dag::Graph;
use crate::partition::{PartitionConfig, PartitionOutcome};
use crate::schedule::{Schedule, ScheduleConfig};
use crate::types::CapacityPolicy;

/// Parameters for both stages of a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanConfig {
    pub partition: PartitionConfig,
    pub schedule: ScheduleConfig,
}

/// What one run hands back to the caller.
#[derive(Debug, Clone)]
pub struct PlanOutput {
    pub partition: PartitionOutcome,
    pub schedule: Schedule,
}

/// Partition `graph`, then schedule it under the resulting groups.
///
/// The graph is only read; all run state is returned in [`PlanOutput`].
pub fn plan(graph: &Graph, config: &PlanConfig) -> errors::Result<PlanOutput> {
    graph.ensure_acyclic()?;

    let partition = partition::partition(graph, &config.partition)?;
    let schedule = schedule::schedule(graph, &partition.partitioning, &config.schedule)?;

    Ok(PlanOutput {
        partition,
        schedule,
    })
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - partitioning and scheduling
/// - the stdout report
pub fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let mut raw = load_from_path(&config_path)?;
    apply_overrides(&mut raw, &args);
    let cfg = ConfigFile::try_from(raw)?;

    if args.dry_run {
        report::print_dry_run(&cfg);
        return Ok(());
    }

    let plan_config = cfg.plan_config();
    info!(
        nodes = cfg.graph().node_count(),
        edges = cfg.graph().edge_count(),
        resource_limit = plan_config.partition.resource_limit,
        size_limit = plan_config.partition.size_limit,
        slots_per_cycle = plan_config.schedule.slots_per_cycle,
        "planning task graph"
    );

    let output = plan(cfg.graph(), &plan_config)?;
    report::print_plan(cfg.graph(), &plan_config, &output);
    Ok(())
}

/// CLI flags take precedence over values from the TOML file.
fn apply_overrides(raw: &mut RawConfigFile, args: &CliArgs) {
    if let Some(v) = args.resource_limit {
        raw.partition.resource_limit = v;
    }
    if let Some(v) = args.size_limit {
        raw.partition.size_limit = v;
    }
    if let Some(v) = args.max_sweeps {
        raw.partition.max_sweeps = v;
    }
    if args.strict_capacity {
        raw.partition.capacity_policy = CapacityPolicy::Error;
    }
    if let Some(v) = args.slots_per_cycle {
        raw.schedule.slots_per_cycle = v;
    }
    if let Some(v) = args.exec_delay {
        raw.schedule.node_execution_delay = v;
    }
    if let Some(v) = args.offset_scale {
        raw.schedule.offset_scale = v;
    }
    if let Some(v) = args.max_cycles {
        raw.schedule.max_cycles = v;
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn overrides_replace_file_values() {
        let mut raw = RawConfigFile::default();
        let args = CliArgs::parse_from([
            "reusedag",
            "--size-limit",
            "2",
            "--offset-scale",
            "3",
            "--strict-capacity",
        ]);
        apply_overrides(&mut raw, &args);

        assert_eq!(raw.partition.size_limit, 2);
        assert_eq!(raw.partition.resource_limit, 150);
        assert_eq!(raw.schedule.offset_scale, 3);
        assert_eq!(raw.partition.capacity_policy, CapacityPolicy::Error);
    }
}
