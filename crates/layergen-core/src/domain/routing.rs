//! Which backend a provider talks to, and how.

use crate::domain::{DomainError, ProviderConfig, ProviderKind};

/// Completion budget for legacy completion models.
pub const MAX_COMPLETION_TOKENS: u32 = 4000;

/// Sampling temperature for every cloud call.
pub const TEMPERATURE: f32 = 0.2;

/// System message sent ahead of the prompt on cloud chat calls.
pub const SYSTEM_INSTRUCTION: &str =
    "You are an expert software engineer. Answer only with the requested JSON object.";

/// Legacy code models that only speak the completion API.
const COMPLETION_MODELS: &[&str] = &[
    "code-davinci-002",
    "code-davinci-001",
    "code-cushman-002",
    "code-cushman-001",
];

/// Resolved call target for one provider.
#[derive(Clone, PartialEq, Eq)]
pub enum BackendTarget {
    Local {
        endpoint: String,
        model: String,
    },
    Cloud {
        model: String,
        secret: String,
        /// `None` uses the backend's default base URL.
        endpoint: Option<String>,
    },
}

impl BackendTarget {
    /// Route a provider. Cloud providers without a secret fail here, before
    /// any network call.
    pub fn from_provider(provider: &ProviderConfig) -> Result<Self, DomainError> {
        match provider.kind() {
            ProviderKind::Local => Ok(Self::Local {
                endpoint: provider.effective_endpoint().to_string(),
                model: provider.effective_model().to_string(),
            }),
            ProviderKind::Cloud => {
                let secret = provider.resolved_secret().ok_or_else(|| {
                    DomainError::MissingSecret {
                        provider: provider.name().to_string(),
                    }
                })?;
                Ok(Self::Cloud {
                    model: provider.effective_model().to_string(),
                    secret: secret.to_string(),
                    endpoint: provider.cloud_endpoint().map(str::to_string),
                })
            }
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Local { .. } => ProviderKind::Local,
            Self::Cloud { .. } => ProviderKind::Cloud,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Self::Local { model, .. } | Self::Cloud { model, .. } => model,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Local { endpoint, .. } => Some(endpoint),
            Self::Cloud { endpoint, .. } => endpoint.as_deref(),
        }
    }
}

// Secrets stay out of logs and debug output.
impl std::fmt::Debug for BackendTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local { endpoint, model } => f
                .debug_struct("Local")
                .field("endpoint", endpoint)
                .field("model", model)
                .finish(),
            Self::Cloud {
                model, endpoint, ..
            } => f
                .debug_struct("Cloud")
                .field("model", model)
                .field("secret", &"<redacted>")
                .field("endpoint", endpoint)
                .finish(),
        }
    }
}

/// Calling convention for a cloud model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStyle {
    Chat,
    Completion,
}

impl CallStyle {
    pub fn for_model(model: &str) -> Self {
        if is_completion_model(model) {
            Self::Completion
        } else {
            Self::Chat
        }
    }
}

/// Legacy code models use the completion endpoint.
pub fn is_completion_model(model: &str) -> bool {
    COMPLETION_MODELS.contains(&model) || model.starts_with("code-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codex_models_use_completion() {
        for model in COMPLETION_MODELS {
            assert_eq!(CallStyle::for_model(model), CallStyle::Completion);
        }
        assert_eq!(CallStyle::for_model("code-llama-x"), CallStyle::Completion);
    }

    #[test]
    fn chat_models_use_chat() {
        for model in ["gpt-4", "gpt-4o", "gpt-3.5-turbo", "claude-code", "deepseek-coder"] {
            assert_eq!(CallStyle::for_model(model), CallStyle::Chat, "{model}");
        }
    }

    #[test]
    fn local_target_uses_effective_values() {
        let provider = ProviderConfig::new("ollama", ProviderKind::Local).unwrap();
        let target = BackendTarget::from_provider(&provider).unwrap();
        assert_eq!(
            target,
            BackendTarget::Local {
                endpoint: "http://localhost:11434".into(),
                model: "deepseek-coder-v2".into(),
            }
        );
    }

    #[test]
    fn cloud_target_requires_secret() {
        let provider = ProviderConfig::new("openai", ProviderKind::Cloud).unwrap();
        let err = BackendTarget::from_provider(&provider).unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingSecret {
                provider: "openai".into()
            }
        );
    }

    #[test]
    fn cloud_target_carries_endpoint_override() {
        let provider = ProviderConfig::new("azure", ProviderKind::Cloud)
            .unwrap()
            .with_secret("sk")
            .with_extra("base_url", "https://example.test/v1");
        let target = BackendTarget::from_provider(&provider).unwrap();
        assert_eq!(target.endpoint(), Some("https://example.test/v1"));
        assert_eq!(target.model(), "gpt-4");
    }

    #[test]
    fn debug_output_hides_secret() {
        let provider = ProviderConfig::new("openai", ProviderKind::Cloud)
            .unwrap()
            .with_secret("sk-very-secret");
        let target = BackendTarget::from_provider(&provider).unwrap();
        assert!(!format!("{target:?}").contains("sk-very-secret"));
    }
}
