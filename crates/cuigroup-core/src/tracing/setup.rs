//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "CUIGROUP_LOG";

/// Initialize the cuigroup tracing/logging system.
///
/// Reads `CUIGROUP_LOG` for per-module log levels, e.g.
/// `CUIGROUP_LOG=cuigroup_grouping=debug,cuigroup_storage=warn`.
/// Falls back to `default_directives` when unset or invalid.
///
/// Idempotent: only the first call installs a subscriber.
pub fn init_tracing(default_directives: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(default_directives));

        // A subscriber may already be installed by an embedding application.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .try_init();
    });
}

/// Default directives: info for every cuigroup crate.
pub const DEFAULT_DIRECTIVES: &str =
    "cuigroup_core=info,cuigroup_grouping=info,cuigroup_storage=info,cuigroup=info";
