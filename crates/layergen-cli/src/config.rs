//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `LAYERGEN_<KEY>`, nested keys joined with `__`
//!    (`LAYERGEN_PROVISIONING__PULL_TIMEOUT_SECS=60`)
//! 3. Config file (`--config`, or [`AppConfig::config_path`] when present)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use layergen_core::application::DEFAULT_PULL_TIMEOUT;
use layergen_core::domain::ProjectSettings;

const APP_NAME: &str = "layergen";
const ENV_PREFIX: &str = "LAYERGEN";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Location of the global provider registry.
    pub registry_path: PathBuf,
    /// Default values for new projects.
    pub defaults: Defaults,
    /// Output settings.
    pub output: OutputConfig,
    /// Policy template settings.
    pub policies: PolicyConfig,
    /// Model download settings.
    pub provisioning: ProvisioningConfig,
    /// HTTP client settings for model backends.
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub language: String,
    pub pattern: String,
    pub app: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Directory of `<language>/<stage>.txt` overrides.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    pub pull_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout for chat and completion calls.
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            registry_path: Self::default_registry_path(),
            defaults: Defaults::default(),
            output: OutputConfig {
                no_color: false,
                format: "auto".into(),
            },
            policies: PolicyConfig::default(),
            provisioning: ProvisioningConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        let settings = ProjectSettings::default();
        Self {
            language: settings.language,
            pattern: settings.pattern,
            app: settings.app,
        }
    }
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            pull_timeout_secs: DEFAULT_PULL_TIMEOUT.as_secs(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 300 }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the config file, then environment.
    ///
    /// An explicit `config_file` must exist; the default location is optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        Self::load_from(&path, required, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(path: &Path, required: bool, env: Environment) -> anyhow::Result<Self> {
        let defaults = Config::try_from(&Self::default()).context("invalid built-in defaults")?;

        let settings = Config::builder()
            .add_source(defaults)
            .add_source(File::from(path).required(required))
            .add_source(
                env.prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .context("configuration has an unexpected shape")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.layergen/config.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    fn default_registry_path() -> PathBuf {
        Self::config_dir().join("providers.toml")
    }

    fn config_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".layergen"))
    }

    pub fn pull_timeout(&self) -> Duration {
        Duration::from_secs(self.provisioning.pull_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// Settings for `init`, with CLI values taking precedence.
    pub fn project_settings(
        &self,
        language: Option<String>,
        pattern: Option<String>,
        app: Option<String>,
    ) -> ProjectSettings {
        ProjectSettings {
            language: language.unwrap_or_else(|| self.defaults.language.clone()),
            pattern: pattern.unwrap_or_else(|| self.defaults.pattern.clone()),
            app: app.unwrap_or_else(|| self.defaults.app.clone()),
        }
    }
}
