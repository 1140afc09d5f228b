//! Flags accepted by every `layergen` subcommand.

use std::path::PathBuf;

use clap::{ArgAction, Args, ValueEnum};

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Log more: -v shows pipeline steps, -vv prompts sizes and backend
    /// routing, -vvv everything.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only report errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Never emit ANSI colors (also set by NO_COLOR).
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Application config file [default: <config dir>/layergen/config.toml]
    #[arg(short, long, global = true, value_name = "FILE", env = "LAYERGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// How results are printed on stdout.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human on a terminal, plain otherwise.
    #[default]
    Auto,
    Human,
    Plain,
    /// Structured output for `provider show`, `config list` and `generate`.
    Json,
}
