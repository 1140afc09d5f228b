//! Per-project configuration and provider resolution.

use std::collections::BTreeMap;

use tracing::warn;

use crate::domain::{DomainError, ProviderConfig, Registry};

/// File name of the per-project configuration.
pub const PROJECT_FILE: &str = ".layergen.toml";

/// File name of the requirements document at the project root.
pub const REQUIREMENTS_FILE: &str = "requirements.md";

/// What the project is: target language, architecture pattern, app type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSettings {
    pub language: String,
    pub pattern: String,
    pub app: String,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            language: "python".into(),
            pattern: "ddd".into(),
            app: "api".into(),
        }
    }
}

/// Contents of `.layergen.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    pub settings: ProjectSettings,
    pub default_provider: String,
    pub providers: BTreeMap<String, ProviderConfig>,
}

impl ProjectConfig {
    /// A project pinned to a single provider.
    pub fn new(settings: ProjectSettings, provider: ProviderConfig) -> Self {
        let name = provider.name().to_string();
        let mut providers = BTreeMap::new();
        providers.insert(name.clone(), provider);

        Self {
            settings,
            default_provider: name,
            providers,
        }
    }

    /// Copy with secrets removed from every provider, ready to persist.
    pub fn without_secrets(&self) -> Self {
        Self {
            settings: self.settings.clone(),
            default_provider: self.default_provider.clone(),
            providers: self
                .providers
                .iter()
                .map(|(name, provider)| (name.clone(), provider.without_secrets()))
                .collect(),
        }
    }
}

/// Pick the project's provider and fill in secrets from the registry.
///
/// Non-secret fields come only from the project file. Secrets already in
/// the project entry win over the registry's.
pub fn resolve_provider(
    project: &ProjectConfig,
    registry: &Registry,
) -> Result<ProviderConfig, DomainError> {
    let name = project.default_provider.trim();
    if name.is_empty() {
        return Err(DomainError::MissingRequiredField {
            field: "llm.default",
        });
    }

    let mut provider =
        project
            .providers
            .get(name)
            .cloned()
            .ok_or_else(|| DomainError::UnconfiguredDefault {
                name: name.to_string(),
            })?;

    if let Some(registered) = registry.get(name) {
        if provider.merge_secrets_from(registered) {
            warn!(
                provider = name,
                "project file holds its own secret for this provider; the registry secret is ignored"
            );
        }
    }

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProviderKind;

    fn project_with(provider: ProviderConfig) -> ProjectConfig {
        ProjectConfig::new(ProjectSettings::default(), provider)
    }

    #[test]
    fn registry_secret_fills_missing_project_secret() {
        let project = project_with(
            ProviderConfig::new("openai", ProviderKind::Cloud)
                .unwrap()
                .with_model("gpt-4o"),
        );
        let mut registry = Registry::new();
        registry.add_provider(
            ProviderConfig::new("openai", ProviderKind::Cloud)
                .unwrap()
                .with_model("gpt-3.5-turbo")
                .with_secret("sk-registry"),
        );

        let resolved = resolve_provider(&project, &registry).unwrap();

        assert_eq!(resolved.secret(), Some("sk-registry"));
        assert_eq!(resolved.model(), Some("gpt-4o"));
    }

    #[test]
    fn project_secret_wins_over_registry() {
        let project = project_with(
            ProviderConfig::new("openai", ProviderKind::Cloud)
                .unwrap()
                .with_secret("sk-project"),
        );
        let mut registry = Registry::new();
        registry.add_provider(
            ProviderConfig::new("openai", ProviderKind::Cloud)
                .unwrap()
                .with_secret("sk-registry"),
        );

        let resolved = resolve_provider(&project, &registry).unwrap();
        assert_eq!(resolved.secret(), Some("sk-project"));
    }

    #[test]
    fn provider_missing_from_registry_resolves_without_secret() {
        let project = project_with(ProviderConfig::new("ollama", ProviderKind::Local).unwrap());

        let resolved = resolve_provider(&project, &Registry::new()).unwrap();
        assert_eq!(resolved.secret(), None);
        assert_eq!(resolved.name(), "ollama");
    }

    #[test]
    fn unknown_default_is_reported_by_name() {
        let mut project = project_with(ProviderConfig::new("ollama", ProviderKind::Local).unwrap());
        project.default_provider = "openai".into();

        let err = resolve_provider(&project, &Registry::new()).unwrap_err();
        assert_eq!(
            err,
            DomainError::UnconfiguredDefault {
                name: "openai".into()
            }
        );
    }

    #[test]
    fn without_secrets_strips_all_providers() {
        let project = project_with(
            ProviderConfig::new("openai", ProviderKind::Cloud)
                .unwrap()
                .with_secret("sk"),
        );
        let stripped = project.without_secrets();
        assert_eq!(stripped.providers["openai"].secret(), None);
    }
}
