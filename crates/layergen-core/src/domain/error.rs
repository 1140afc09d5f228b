// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they travel inside `LayergenError`)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("Invalid provider configuration: {0}")]
    InvalidProvider(String),

    #[error("Unknown provider kind '{0}' (expected 'local' or 'cloud')")]
    UnknownProviderKind(String),

    #[error("Unknown generation stage '{0}' (expected 'domain' or 'layout')")]
    UnknownStage(String),

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    #[error("Provider '{provider}' has no API key configured")]
    MissingSecret { provider: String },

    #[error("default provider '{name}' is not configured in the project file")]
    UnconfiguredDefault { name: String },

    // ========================================================================
    // Manifest Errors
    // ========================================================================
    #[error("Failed to parse a file manifest from the model response: {reason}\nResponse snippet: {snippet}")]
    ManifestParse { reason: String, snippet: String },

    #[error("The model response contained no files to generate")]
    EmptyManifest,

    #[error("Manifest entry #{index} is invalid: {reason}")]
    InvalidManifestEntry { index: usize, reason: String },

    #[error("Manifest path '{path}' escapes the output directory")]
    UnsafeManifestPath { path: String },

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    #[error("Provider '{name}' not found")]
    ProviderNotFound { name: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownProviderKind(_) => vec![
                "Supported provider kinds:".into(),
                "  • local  - a model served by a local Ollama daemon".into(),
                "  • cloud  - an OpenAI-compatible HTTPS API".into(),
            ],
            Self::ProviderNotFound { name } => vec![
                format!("No provider named '{}' is registered", name),
                "Try: layergen provider show".into(),
                format!("Or add it: layergen provider add {}", name),
            ],
            Self::ManifestParse { .. } => vec![
                "The model did not answer with the expected JSON manifest".into(),
                "Inspect the snippet above, or re-run with --debug to see the full response".into(),
                "Models with JSON output support give more reliable results".into(),
            ],
            Self::EmptyManifest => vec![
                "The model returned an empty 'files' list".into(),
                "Check that requirements.md describes something to generate".into(),
            ],
            Self::UnsafeManifestPath { .. } => vec![
                "Generated paths must stay inside the project directory".into(),
                "Re-run the generation; no file was written for this response".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidProvider(_)
            | Self::UnknownProviderKind(_)
            | Self::UnknownStage(_)
            | Self::MissingRequiredField { .. }
            | Self::MissingSecret { .. }
            | Self::UnconfiguredDefault { .. }
            | Self::ManifestParse { .. }
            | Self::EmptyManifest
            | Self::InvalidManifestEntry { .. }
            | Self::UnsafeManifestPath { .. } => ErrorCategory::Validation,
            Self::ProviderNotFound { .. } => ErrorCategory::NotFound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}
