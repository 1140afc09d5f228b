//! Tracing subscriber for the binary.
//!
//! The library crates only emit events; this is the one place a subscriber
//! is installed. Events go to stderr so stdout stays clean for `--output-format
//! json`. `RUST_LOG` replaces the flag-derived filter entirely.

use std::io::IsTerminal as _;

use anyhow::anyhow;
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::cli::GlobalArgs;

/// Crates whose events are shown under the flag-derived filter.
const TARGETS: [&str; 3] = ["layergen", "layergen_core", "layergen_adapters"];

pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let level = level_for(args);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)));

    // Targets only help once spans from several crates interleave.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(!args.no_color && std::io::stderr().is_terminal())
        .with_target(level >= LevelFilter::DEBUG)
        .without_time();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("tracing subscriber already installed: {e}"))
}

fn level_for(args: &GlobalArgs) -> LevelFilter {
    if args.quiet {
        return LevelFilter::ERROR;
    }
    match args.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Third-party crates (reqwest, hyper) stay at `warn` whatever the level.
fn directives(level: LevelFilter) -> String {
    let targets = TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    format!("warn,{targets}")
}
