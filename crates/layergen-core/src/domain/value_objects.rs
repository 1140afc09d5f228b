//! Value objects: small, immutable, self-validating types.

use std::fmt;
use std::str::FromStr;

use crate::domain::DomainError;

// ============================================================================
// ProviderKind
// ============================================================================

/// Where a provider's model runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// A model served by a local daemon (Ollama-compatible API).
    Local,
    /// A hosted model behind an OpenAI-compatible HTTPS API.
    Cloud,
}

impl ProviderKind {
    pub const ALL: &'static [ProviderKind] = &[ProviderKind::Local, ProviderKind::Cloud];

    /// Provider names that are assumed to be local when no kind is given.
    const LOCAL_NAMES: &'static [&'static str] = &["ollama", "lm-studio", "local"];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Cloud => "cloud",
        }
    }

    /// Guess the kind from a provider name.
    pub fn infer_from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if Self::LOCAL_NAMES.contains(&lower.as_str()) {
            Self::Local
        } else {
            Self::Cloud
        }
    }

    /// Model used when a provider does not name one.
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Local => "deepseek-coder-v2",
            Self::Cloud => "gpt-4",
        }
    }

    /// Endpoint used when a provider does not name one.
    pub const fn default_endpoint(self) -> &'static str {
        match self {
            Self::Local => "http://localhost:11434",
            Self::Cloud => "https://api.openai.com/v1",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "cloud" => Ok(Self::Cloud),
            _ => Err(DomainError::UnknownProviderKind(s.to_string())),
        }
    }
}

// ============================================================================
// GenerationStage
// ============================================================================

/// One pass of the generation pipeline.
///
/// Stages differ only in which policy template they use, which layers they
/// ask the model for, and whether earlier output is fed back in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationStage {
    /// Domain layer: aggregates, entities, value objects, services, errors.
    Domain,
    /// Skeletons for the application, infrastructure and interface layers.
    Layout,
}

impl GenerationStage {
    pub const ALL: &'static [GenerationStage] = &[GenerationStage::Domain, GenerationStage::Layout];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Layout => "layout",
        }
    }

    /// Layers the model is asked to produce.
    pub const fn target_layers(self) -> &'static [&'static str] {
        match self {
            Self::Domain => &["domain"],
            Self::Layout => &["application", "infrastructure", "interface"],
        }
    }

    /// Project-relative directory whose files are fed back into the prompt.
    pub const fn prior_artifact_dir(self) -> Option<&'static str> {
        match self {
            Self::Domain => None,
            Self::Layout => Some("src/domain"),
        }
    }
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationStage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "domain" => Ok(Self::Domain),
            "layout" => Ok(Self::Layout),
            _ => Err(DomainError::UnknownStage(s.to_string())),
        }
    }
}

// ============================================================================
// Language helpers
// ============================================================================

/// Source file extension for a target language, if known.
pub fn source_extension(language: &str) -> Option<&'static str> {
    match language.trim().to_ascii_lowercase().as_str() {
        "python" | "py" => Some("py"),
        "rust" | "rs" => Some("rs"),
        "typescript" | "ts" => Some("ts"),
        "javascript" | "js" => Some("js"),
        "go" | "golang" => Some("go"),
        "java" => Some("java"),
        "kotlin" => Some("kt"),
        "csharp" | "c#" => Some("cs"),
        _ => None,
    }
}

/// Fence tag for a path, inferred from its extension.
pub fn fence_language(path: &str) -> &'static str {
    let ext = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    match ext {
        "py" => "python",
        "rs" => "rust",
        "ts" => "typescript",
        "js" => "javascript",
        "go" => "go",
        "java" => "java",
        "kt" => "kotlin",
        "cs" => "csharp",
        "toml" => "toml",
        "json" => "json",
        "yml" | "yaml" => "yaml",
        "md" => "markdown",
        _ => "",
    }
}
