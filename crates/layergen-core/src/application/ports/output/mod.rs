//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `layergen-adapters` crate provides implementations.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::domain::{GenerationStage, ProgressEvent, ProjectConfig, PullPayload, Registry};
use crate::error::LayergenResult;

// ============================================================================
// Filesystem & stores
// ============================================================================

/// Port for filesystem operations.
///
/// Implemented by:
/// - `layergen_adapters::filesystem::LocalFilesystem` (production)
/// - `layergen_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> LayergenResult<()>;

    /// Write content to a file, replacing any previous content.
    fn write_file(&self, path: &Path, content: &str) -> LayergenResult<()>;

    fn read_to_string(&self, path: &Path) -> LayergenResult<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Every file below `dir`, recursively, sorted. A missing directory
    /// yields an empty list.
    fn list_files(&self, dir: &Path) -> LayergenResult<Vec<PathBuf>>;
}

/// Port for the user-scoped provider registry.
///
/// The location is fixed when the adapter is constructed.
#[cfg_attr(test, automock)]
pub trait RegistryStore: Send + Sync {
    /// Load the registry. A missing file is an empty registry.
    fn load(&self) -> LayergenResult<Registry>;

    fn save(&self, registry: &Registry) -> LayergenResult<()>;

    /// Human-readable location, for messages.
    fn location(&self) -> String;
}

/// Port for the per-project configuration file.
#[cfg_attr(test, automock)]
pub trait ProjectStore: Send + Sync {
    /// Fails with `MissingProjectConfig` when the file is absent.
    fn load(&self, project_dir: &Path) -> LayergenResult<ProjectConfig>;

    /// Persist a new project file with secrets stripped. Refuses to
    /// overwrite (`ProjectExists`). Returns the written path.
    fn create(&self, project_dir: &Path, project: &ProjectConfig) -> LayergenResult<PathBuf>;
}

/// Port for policy templates.
#[cfg_attr(test, automock)]
pub trait PolicyStore: Send + Sync {
    /// Fails with `MissingPolicy` when no template matches.
    fn get(&self, language: &str, stage: GenerationStage) -> LayergenResult<String>;
}

// ============================================================================
// Model backends
// ============================================================================

/// Failure talking to a model backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    /// The backend answered, but with an error of its own.
    #[error("backend error: {0}")]
    Remote(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Streamed response text, one chunk per item.
pub type TextStream = BoxStream<'static, Result<String, TransportError>>;

/// Streamed pull progress, one payload per item.
pub type PullStream = BoxStream<'static, Result<PullPayload, TransportError>>;

/// Port for chatting with a locally served model.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LocalBackend: Send + Sync {
    /// Blocking (non-streamed) chat call; returns the full reply.
    async fn chat(
        &self,
        endpoint: &str,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String, TransportError>;

    /// Streamed chat call. `Ok(None)` means this backend cannot stream.
    async fn chat_stream(
        &self,
        endpoint: &str,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<Option<TextStream>, TransportError>;
}

/// Port for downloading a model into a local backend.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ModelPuller: Send + Sync {
    /// Streamed pull. `Ok(None)` means this backend cannot stream.
    async fn pull_stream(
        &self,
        endpoint: &str,
        model: &str,
    ) -> Result<Option<PullStream>, TransportError>;

    /// Blocking pull; returns the backend's final response.
    async fn pull(&self, endpoint: &str, model: &str) -> Result<serde_json::Value, TransportError>;
}

/// A chat request to a hosted OpenAI-compatible API.
#[derive(Clone, PartialEq)]
pub struct CloudChatRequest {
    /// `None` uses the adapter's default base URL.
    pub endpoint: Option<String>,
    pub secret: String,
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// A legacy completion request to a hosted OpenAI-compatible API.
#[derive(Clone, PartialEq)]
pub struct CloudCompletionRequest {
    pub endpoint: Option<String>,
    pub secret: String,
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl fmt::Debug for CloudChatRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudChatRequest")
            .field("endpoint", &self.endpoint)
            .field("secret", &"<redacted>")
            .field("model", &self.model)
            .field("messages", &self.messages.len())
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl fmt::Debug for CloudCompletionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudCompletionRequest")
            .field("endpoint", &self.endpoint)
            .field("secret", &"<redacted>")
            .field("model", &self.model)
            .field("prompt_len", &self.prompt.len())
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Port for hosted models.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CloudBackend: Send + Sync {
    async fn chat_completion(&self, request: CloudChatRequest) -> Result<String, TransportError>;

    async fn completion(&self, request: CloudCompletionRequest) -> Result<String, TransportError>;
}

// ============================================================================
// Progress
// ============================================================================

pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Receives progress events inline while a stream is consumed.
#[cfg_attr(test, automock)]
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent) -> Result<(), SinkError>;
}

/// Forward an event to an optional sink. Sink failures never abort the
/// operation; they are logged at debug level.
pub(crate) fn notify(sink: Option<&dyn ProgressSink>, event: &ProgressEvent) {
    if let Some(sink) = sink {
        if let Err(err) = sink.on_progress(event) {
            debug!(error = %err, "progress sink failed; continuing");
        }
    }
}
