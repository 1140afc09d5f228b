//! Unified error handling for Layergen Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Layergen Core operations.
///
/// This enum wraps all possible errors that can occur when using layergen-core,
/// providing a unified interface for error handling.
#[derive(Debug, Error, Clone)]
pub enum LayergenError {
    /// Errors from the domain layer (business rule violations).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration failures).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl LayergenError {
    /// Shorthand for a [`LayergenError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { .. } => vec![
                "Check the project file (.layergen.toml) and the provider registry".into(),
                "Try: layergen provider show".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Layergen".into(),
                "Please report this issue at: https://github.com/cosecruz/layergen/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Check if re-running the same command may succeed.
    ///
    /// Nothing in the core retries on its own; this only drives the hint
    /// shown by the command boundary.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Application(
                ApplicationError::Backend { .. }
                    | ApplicationError::ProvisionTimeout { .. }
                    | ApplicationError::Provision { .. }
            ) | Self::Domain(DomainError::ManifestParse { .. } | DomainError::EmptyManifest)
        )
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Backend,
    Internal,
}

/// Convenient result type alias.
pub type LayergenResult<T> = Result<T, LayergenError>;
