//! The per-project `.layergen.toml` file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use layergen_core::{
    application::{ApplicationError, ports::ProjectStore},
    domain::{DomainValidator, PROJECT_FILE, ProjectConfig, ProjectSettings},
    error::LayergenResult,
};

use super::{dto::LlmSection, store_error};

#[derive(Debug, Serialize, Deserialize)]
struct ProjectFile {
    #[serde(default)]
    project: ProjectSection,
    #[serde(default)]
    llm: LlmSection,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct ProjectSection {
    language: String,
    pattern: String,
    app: String,
}

impl Default for ProjectSection {
    fn default() -> Self {
        let ProjectSettings {
            language,
            pattern,
            app,
        } = ProjectSettings::default();
        Self {
            language,
            pattern,
            app,
        }
    }
}

/// Reads and creates `.layergen.toml` in a project directory.
///
/// Secrets are never written; they are merged back in from the registry
/// when the provider is resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlProjectStore;

impl TomlProjectStore {
    pub fn new() -> Self {
        Self
    }
}

impl ProjectStore for TomlProjectStore {
    #[instrument(skip(self))]
    fn load(&self, project_dir: &Path) -> LayergenResult<ProjectConfig> {
        let path = project_dir.join(PROJECT_FILE);
        if !path.is_file() {
            return Err(ApplicationError::MissingProjectConfig { path }.into());
        }

        let text = fs::read_to_string(&path).map_err(|e| store_error(&path, e))?;
        let file: ProjectFile = toml::from_str(&text).map_err(|e| store_error(&path, e))?;
        let (default, providers) = file
            .llm
            .providers_into_domain()
            .map_err(|e| store_error(&path, e))?;

        let project = ProjectConfig {
            settings: ProjectSettings {
                language: file.project.language,
                pattern: file.project.pattern,
                app: file.project.app,
            },
            default_provider: default.unwrap_or_default(),
            providers: providers
                .into_iter()
                .map(|p| (p.name().to_string(), p))
                .collect(),
        };
        DomainValidator::validate_project(&project)?;

        debug!(provider = %project.default_provider, "Project file loaded");
        Ok(project)
    }

    #[instrument(skip(self, project))]
    fn create(&self, project_dir: &Path, project: &ProjectConfig) -> LayergenResult<PathBuf> {
        let path = project_dir.join(PROJECT_FILE);
        if path.exists() {
            return Err(ApplicationError::ProjectExists { path }.into());
        }

        let stripped = project.without_secrets();
        let file = ProjectFile {
            project: ProjectSection {
                language: stripped.settings.language.clone(),
                pattern: stripped.settings.pattern.clone(),
                app: stripped.settings.app.clone(),
            },
            llm: LlmSection::from_domain(
                Some(stripped.default_provider.as_str()),
                stripped.providers.values(),
            ),
        };
        let text = toml::to_string_pretty(&file).map_err(|e| store_error(&path, e))?;

        fs::create_dir_all(project_dir).map_err(|e| store_error(project_dir, e))?;
        fs::write(&path, text).map_err(|e| store_error(&path, e))?;

        debug!(path = %path.display(), "Project file written");
        Ok(path)
    }
}
