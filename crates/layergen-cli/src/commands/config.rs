//! `layergen config` - inspect configuration values.

use crate::{
    cli::{ConfigCommands, OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(cmd: ConfigCommands, config: &AppConfig, output: &OutputManager) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(config, &key)?;
            output.print(&value)?;
        }

        ConfigCommands::List => {
            if output.format() == OutputFormat::Json {
                output.json(config)?;
                return Ok(());
            }
            output.header("Current Configuration:")?;
            let serialised =
                toml::to_string_pretty(config).map_err(|e| CliError::ConfigError {
                    message: format!("Failed to serialise config: {e}"),
                    source: Some(Box::new(e)),
                })?;
            output.print(&serialised)?;
        }

        ConfigCommands::Path => {
            output.print(&AppConfig::config_path().display().to_string())?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn get_config_value(config: &AppConfig, key: &str) -> CliResult<String> {
    match key {
        "registry_path" => Ok(config.registry_path.display().to_string()),
        "defaults.language" => Ok(config.defaults.language.clone()),
        "defaults.pattern" => Ok(config.defaults.pattern.clone()),
        "defaults.app" => Ok(config.defaults.app.clone()),
        "output.no_color" => Ok(config.output.no_color.to_string()),
        "output.format" => Ok(config.output.format.clone()),
        "policies.dir" => Ok(config
            .policies
            .dir
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default()),
        "provisioning.pull_timeout_secs" => Ok(config.provisioning.pull_timeout_secs.to_string()),
        "http.timeout_secs" => Ok(config.http.timeout_secs.to_string()),
        _ => Err(CliError::ConfigError {
            message: format!("Unknown config key: '{key}'"),
            source: None,
        }),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_known_keys() {
        let cfg = AppConfig::default();
        assert_eq!(get_config_value(&cfg, "defaults.language").unwrap(), "python");
        assert_eq!(
            get_config_value(&cfg, "provisioning.pull_timeout_secs").unwrap(),
            "600"
        );
        assert_eq!(get_config_value(&cfg, "policies.dir").unwrap(), "");
    }

    #[test]
    fn get_unknown_key_is_error() {
        let cfg = AppConfig::default();
        assert!(matches!(
            get_config_value(&cfg, "does.not.exist"),
            Err(CliError::ConfigError { .. })
        ));
    }

    #[test]
    fn config_serialises_as_toml() {
        let rendered = toml::to_string_pretty(&AppConfig::default()).unwrap();
        assert!(rendered.contains("[provisioning]"));
        assert!(rendered.contains("pull_timeout_secs = 600"));
    }
}
