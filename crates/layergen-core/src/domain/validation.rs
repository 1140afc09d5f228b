use crate::domain::{DomainError, FileManifest, ProjectConfig, Registry};

/// Centralized domain validation.
pub struct DomainValidator;

impl DomainValidator {
    /// The default provider, when set, must key an entry.
    pub fn validate_registry(registry: &Registry) -> Result<(), DomainError> {
        match registry.default_provider() {
            Some(name) if registry.get(name).is_none() => Err(DomainError::ProviderNotFound {
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Field presence only; an unknown default is reported when the
    /// provider is resolved.
    pub fn validate_project(project: &ProjectConfig) -> Result<(), DomainError> {
        let settings = &project.settings;
        if settings.language.trim().is_empty() {
            return Err(DomainError::MissingRequiredField {
                field: "project.language",
            });
        }
        if project.default_provider.trim().is_empty() {
            return Err(DomainError::MissingRequiredField {
                field: "llm.default",
            });
        }
        Ok(())
    }

    pub fn validate_manifest(manifest: &FileManifest) -> Result<(), DomainError> {
        if manifest.is_empty() {
            return Err(DomainError::EmptyManifest);
        }
        Ok(())
    }
}
