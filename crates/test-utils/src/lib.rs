//! Shared helpers for reusedag integration tests: graph/config builders and
//! a test-friendly tracing subscriber.

pub mod builders;

use std::sync::Once;

use reusedag::logging::{env_filter, LOG_ENV};
use tracing_subscriber::fmt;

static INIT: Once = Once::new();

/// Install a subscriber whose output the test harness captures.
///
/// Reads the same `REUSEDAG_LOG` directives as the binary, e.g.
/// `REUSEDAG_LOG=reusedag::partition=debug cargo test -- --nocapture`.
/// Captured output is only shown for failing tests.
pub fn init_tracing() {
    INIT.call_once(|| {
        let env = std::env::var(LOG_ENV).ok();

        // Another harness may already own the global subscriber.
        let _ = fmt()
            .with_env_filter(env_filter(None, env.as_deref()))
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}
