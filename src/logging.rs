//! Diagnostic logging on stderr.
//!
//! Lines are routed around any active progress bar.

use crate::pipeline::progress::BarAwareWriter;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Default filter directive for the given verbosity.
///
/// `-q` wins over `-v`.
pub fn default_directive(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "warn";
    }
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the verbosity flags.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(verbosity: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity, quiet)));

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(|| BarAwareWriter::new(std::io::stderr()))
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(verbosity >= 2)
        .try_init()
    {
        tracing::debug!("subscriber already installed: {e}");
    }
}
