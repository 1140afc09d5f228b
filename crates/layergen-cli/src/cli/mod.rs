//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "layergen",
    bin_name = "layergen",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{26a1} Generate layered architectures with an LLM",
    long_about = "Layergen turns a requirements document into domain, application, \
                  infrastructure and interface code using a local or hosted model.",
    after_help = "EXAMPLES:\n\
        \x20 layergen provider add ollama --model deepseek-coder-v2\n\
        \x20 layergen provider add openai --api-key sk-... --model gpt-4o\n\
        \x20 layergen init --language python --pattern ddd --app api\n\
        \x20 layergen generate domain\n\
        \x20 layergen generate layout --debug",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage the global provider registry.
    #[command(
        about = "Manage LLM providers",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 layergen provider add ollama\n\
            \x20 layergen provider add openai --api-key sk-... --model gpt-4o\n\
            \x20 layergen provider set-default openai\n\
            \x20 layergen provider show"
    )]
    Provider(ProviderCommands),

    /// Initialise a project in the current directory.
    #[command(
        about = "Initialise a project",
        after_help = "EXAMPLES:\n\
            \x20 layergen init\n\
            \x20 layergen init --language rust --pattern hexagonal --app cli"
    )]
    Init(InitArgs),

    /// Run one generation stage.
    #[command(
        visible_alias = "gen",
        about = "Generate code for a stage",
        after_help = "EXAMPLES:\n\
            \x20 layergen generate domain\n\
            \x20 layergen generate layout --dir ./my-app --debug"
    )]
    Generate(GenerateArgs),

    /// Inspect the application configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 layergen config get registry_path\n\
            \x20 layergen config list\n\
            \x20 layergen config path"
    )]
    Config(ConfigCommands),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 layergen completions bash > ~/.local/share/bash-completion/completions/layergen\n\
            \x20 layergen completions zsh  > ~/.zfunc/_layergen\n\
            \x20 layergen completions fish > ~/.config/fish/completions/layergen.fish"
    )]
    Completions(CompletionsArgs),
}

// ── provider ──────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ProviderCommands {
    /// Add a provider, replacing any existing entry with the same name.
    Add(ProviderAddArgs),

    /// Make a registered provider the default.
    SetDefault {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Remove a provider from the registry.
    #[command(visible_alias = "rm")]
    Remove {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Show the registry with secrets redacted.
    #[command(visible_alias = "ls")]
    Show,
}

/// Arguments for `layergen provider add`.
#[derive(Debug, Args)]
pub struct ProviderAddArgs {
    /// Provider name (`ollama`, `lm-studio` and `local` default to a local kind).
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Where the model runs; inferred from the name when omitted.
    #[arg(short = 'k', long = "kind", value_enum, value_name = "KIND")]
    pub kind: Option<KindArg>,

    /// API key for hosted providers.
    #[arg(long = "api-key", value_name = "KEY", env = "LAYERGEN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name.
    #[arg(short = 'm', long = "model", value_name = "MODEL")]
    pub model: Option<String>,

    /// Endpoint URL.
    #[arg(short = 'u', long = "url", value_name = "URL")]
    pub url: Option<String>,

    /// Base URL of an OpenAI-compatible API (stored as `base_url`).
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Local,
    Cloud,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `layergen init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Target language (defaults from config, then `python`).
    #[arg(short = 'l', long = "language", value_name = "LANGUAGE")]
    pub language: Option<String>,

    /// Architecture pattern (defaults from config, then `ddd`).
    #[arg(short = 'p', long = "pattern", value_name = "PATTERN")]
    pub pattern: Option<String>,

    /// Application type (defaults from config, then `api`).
    #[arg(short = 'a', long = "app", value_name = "APP")]
    pub app: Option<String>,

    /// Project directory.
    #[arg(short = 'd', long = "dir", value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `layergen generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Stage to run.
    #[arg(value_enum, value_name = "STAGE")]
    pub stage: StageArg,

    /// Print the prompt and the raw model response.
    #[arg(long = "debug")]
    pub debug: bool,

    /// Project directory.
    #[arg(short = 'd', long = "dir", value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StageArg {
    /// Domain layer.
    Domain,
    /// Application, infrastructure and interface skeletons.
    Layout,
}

// ── config ────────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one configuration value.
    Get {
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Print the effective configuration.
    List,
    /// Print the default configuration file path.
    Path,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `layergen completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}
