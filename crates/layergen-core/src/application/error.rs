//! Application layer errors.
//!
//! These errors represent failures in orchestration and in the adapters
//! behind the ports. Business rule violations are `DomainError`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{DomainError, GenerationStage, ProviderKind};
use crate::error::{ErrorCategory, LayergenError};

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    // ========================================================================
    // Project inputs
    // ========================================================================
    #[error("No project configuration found at {path}")]
    MissingProjectConfig { path: PathBuf },

    #[error("Requirements document not found at {path}")]
    MissingRequirements { path: PathBuf },

    #[error("Requirements document at {path} is empty")]
    EmptyRequirements { path: PathBuf },

    #[error("No {stage} policy available for language '{language}'")]
    MissingPolicy {
        language: String,
        stage: GenerationStage,
    },

    #[error("Project already initialized: {path} exists")]
    ProjectExists { path: PathBuf },

    // ========================================================================
    // Providers
    // ========================================================================
    #[error("Provider '{provider}' has no API key configured")]
    MissingSecret { provider: String },

    #[error("{kind} backend call failed (model '{model}'{}): {reason}", at_endpoint(.endpoint))]
    Backend {
        kind: ProviderKind,
        model: String,
        endpoint: Option<String>,
        reason: String,
    },

    #[error("Pulling model '{model}' from {endpoint} timed out after {seconds}s")]
    ProvisionTimeout {
        model: String,
        endpoint: String,
        seconds: u64,
    },

    #[error("Failed to pull model '{model}' from {endpoint}: {reason}")]
    Provision {
        model: String,
        endpoint: String,
        reason: String,
    },

    // ========================================================================
    // Storage
    // ========================================================================
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    #[error("Failed to read or write {path}: {reason}")]
    Store { path: PathBuf, reason: String },

    /// Store access failed (lock poisoned).
    #[error("Store lock poisoned")]
    StoreLockError,
}

fn at_endpoint(endpoint: &Option<String>) -> String {
    endpoint
        .as_deref()
        .map(|endpoint| format!(" at {endpoint}"))
        .unwrap_or_default()
}

/// Report provider resolution failures the way the rest of the
/// application does: a missing secret is `MissingSecret`, a project default
/// without an entry is a configuration problem.
pub(crate) fn resolution_error(err: DomainError) -> LayergenError {
    match err {
        DomainError::MissingSecret { provider } => ApplicationError::MissingSecret { provider }.into(),
        err @ DomainError::UnconfiguredDefault { .. } => LayergenError::configuration(err.to_string()),
        other => other.into(),
    }
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingProjectConfig { .. } => vec![
                "This directory has not been initialized".into(),
                "Try: layergen init".into(),
            ],
            Self::MissingRequirements { path } | Self::EmptyRequirements { path } => vec![
                format!("Describe what to build in {}", path.display()),
                "Then re-run the generation".into(),
            ],
            Self::MissingPolicy { language, .. } => vec![
                format!("No bundled policy matches '{}'", language),
                "Bundled languages: python, rust".into(),
                "Or point policies.dir (LAYERGEN_POLICIES_DIR) at <dir>/<language>/<stage>.txt".into(),
            ],
            Self::ProjectExists { path } => vec![
                format!("Remove or edit {} to change the provider", path.display()),
            ],
            Self::MissingSecret { provider } => vec![
                format!(
                    "Try: layergen provider add {} --api-key <KEY>",
                    provider
                ),
            ],
            Self::Backend {
                kind: ProviderKind::Local,
                endpoint,
                ..
            } => vec![
                format!(
                    "Ensure the local model server is running at {}",
                    endpoint.as_deref().unwrap_or("its configured URL")
                ),
                "Try: ollama serve".into(),
            ],
            Self::Backend { .. } => vec![
                "Check the API key and model name".into(),
                "Check network connectivity to the provider".into(),
            ],
            Self::ProvisionTimeout { endpoint, .. } => vec![
                format!("Ensure the Ollama server at {} is running and reachable", endpoint),
                "Raise provisioning.pull_timeout_secs for very large models".into(),
            ],
            Self::Provision { .. } => vec![
                "Ensure Ollama is running and the URL is correct".into(),
                "Check that the model name exists in the Ollama library".into(),
            ],
            Self::FilesystemError { path, .. } | Self::Store { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have read and write permissions".into(),
            ],
            Self::StoreLockError => vec!["Try again in a moment".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingProjectConfig { .. }
            | Self::MissingRequirements { .. }
            | Self::EmptyRequirements { .. }
            | Self::MissingPolicy { .. }
            | Self::ProjectExists { .. }
            | Self::MissingSecret { .. }
            | Self::Store { .. } => ErrorCategory::Configuration,
            Self::Backend { .. } | Self::ProvisionTimeout { .. } | Self::Provision { .. } => {
                ErrorCategory::Backend
            }
            Self::FilesystemError { .. } | Self::StoreLockError => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_names_kind_model_and_endpoint() {
        let err = ApplicationError::Backend {
            kind: ProviderKind::Local,
            model: "llama3".into(),
            endpoint: Some("http://localhost:11434".into()),
            reason: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "local backend call failed (model 'llama3' at http://localhost:11434): connection refused"
        );
    }

    #[test]
    fn cloud_backend_message_without_endpoint() {
        let err = ApplicationError::Backend {
            kind: ProviderKind::Cloud,
            model: "gpt-4".into(),
            endpoint: None,
            reason: "401".into(),
        };
        assert_eq!(err.to_string(), "cloud backend call failed (model 'gpt-4'): 401");
        assert_eq!(err.category(), ErrorCategory::Backend);
    }

    #[test]
    fn resolution_errors_are_lifted() {
        let secret = resolution_error(DomainError::MissingSecret {
            provider: "openai".into(),
        });
        assert!(matches!(
            secret,
            LayergenError::Application(ApplicationError::MissingSecret { ref provider }) if provider == "openai"
        ));

        let default = resolution_error(DomainError::UnconfiguredDefault {
            name: "groq".into(),
        });
        assert!(matches!(default, LayergenError::Configuration { ref message } if message.contains("'groq'")));

        let other = resolution_error(DomainError::EmptyManifest);
        assert!(matches!(other, LayergenError::Domain(DomainError::EmptyManifest)));
    }

    #[test]
    fn missing_secret_is_configuration() {
        let err = ApplicationError::MissingSecret {
            provider: "openai".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.suggestions()[0].contains("--api-key"));
    }
}
