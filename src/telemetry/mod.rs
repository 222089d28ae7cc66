//! Logging setup for mtgjudge
//!
//! Diagnostics go through `tracing` to stderr. `RUST_LOG` wins when set;
//! otherwise the level follows the CLI verbosity flags.

use tracing_subscriber::EnvFilter;

use crate::cli::Verbosity;

/// Default filter directive for a verbosity level
pub fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn,mtgjudge=info",
        Verbosity::Verbose => "info,mtgjudge=debug",
        Verbosity::VeryVerbose => "debug,mtgjudge=trace",
    }
}

/// Filter from `RUST_LOG`, falling back to the verbosity default
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)))
}

/// Install the global subscriber; later calls are no-ops
pub fn init(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(matches!(verbosity, Verbosity::VeryVerbose))
        .try_init();
}
