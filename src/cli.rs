// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `reusedag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "reusedag",
    version,
    about = "Partition a task DAG for temporal reuse and list-schedule it cycle by cycle.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML) holding limits, nodes and edges.
    ///
    /// Default: `Reusedag.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Reusedag.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `REUSEDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the graph and limits, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Override `[partition].resource_limit`.
    #[arg(long, value_name = "UNITS")]
    pub resource_limit: Option<u64>,

    /// Override `[partition].size_limit`.
    #[arg(long, value_name = "NODES")]
    pub size_limit: Option<usize>,

    /// Override `[partition].max_sweeps`.
    #[arg(long, value_name = "N")]
    pub max_sweeps: Option<usize>,

    /// Fail instead of warning when a group ends up over `resource_limit`.
    #[arg(long)]
    pub strict_capacity: bool,

    /// Override `[schedule].slots_per_cycle`.
    #[arg(long, value_name = "N")]
    pub slots_per_cycle: Option<usize>,

    /// Override `[schedule].node_execution_delay`.
    #[arg(long, value_name = "CYCLES")]
    pub exec_delay: Option<u64>,

    /// Override `[schedule].offset_scale`.
    #[arg(long, value_name = "CYCLES")]
    pub offset_scale: Option<u64>,

    /// Override `[schedule].max_cycles`.
    #[arg(long, value_name = "N")]
    pub max_cycles: Option<usize>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
