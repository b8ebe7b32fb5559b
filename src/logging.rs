// src/logging.rs

//! Logging setup for `reusedag` using `tracing` + `tracing-subscriber`.
//!
//! Filter precedence:
//! 1. `--log-level` CLI flag, applied to the `reusedag` target
//! 2. `REUSEDAG_LOG` environment variable, as `EnvFilter` directives
//!    (e.g. "debug" or "reusedag::partition=debug,reusedag::schedule=warn")
//! 3. `reusedag=info`
//!
//! Logs are sent to STDERR so that stdout only carries the plan report.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "REUSEDAG_LOG";

const DEFAULT_DIRECTIVE: &str = "reusedag=info";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = env_filter(cli_level, env.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

/// Build the filter from the CLI level and the raw `REUSEDAG_LOG` value.
///
/// Directives that do not parse fall back to the default with a note on
/// stderr, since no subscriber exists yet to log it.
pub fn env_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    let directive = filter_directive(cli_level, env);
    EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("reusedag: ignoring {LOG_ENV}={directive:?}: {e}");
        EnvFilter::new(DEFAULT_DIRECTIVE)
    })
}

fn filter_directive(cli_level: Option<LogLevel>, env: Option<&str>) -> String {
    if let Some(lvl) = cli_level {
        return format!("reusedag={}", level_name(lvl));
    }
    match env.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => DEFAULT_DIRECTIVE.to_string(),
    }
}

fn level_name(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
