//! Logging setup. Diagnostics go to stderr so JSON output on stdout stays clean.
//!
//! `KEYWATCH_LOG` takes standard `tracing` filter directives and wins over
//! `--verbose`; without either, only warnings are shown.

use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "KEYWATCH_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Call once, at startup.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
