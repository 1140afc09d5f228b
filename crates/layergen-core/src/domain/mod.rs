// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Layergen.
//!
//! Pure logic only. Reading files, calling models and persisting
//! configuration happen behind the ports defined in the application layer.
//!
//! - **No async**: domain logic is synchronous
//! - **No I/O**: no filesystem, network, or external calls
//! - **Deterministic**: prompt building and manifest parsing are pure
//!   functions of their inputs
pub mod entities;
pub mod error;
pub mod progress;
pub mod prompt;
pub mod routing;
pub mod value_objects;

mod validation;

pub use entities::{
    common::RelativePath,
    generation::{GenerationRequest, GenerationResult},
    manifest::{FileManifest, FileManifestEntry},
    project::{PROJECT_FILE, ProjectConfig, ProjectSettings, REQUIREMENTS_FILE, resolve_provider},
    provider::{BASE_URL_FIELD, ProviderConfig, REDACTED, SENSITIVE_FIELDS},
    registry::Registry,
};

pub use error::{DomainError, ErrorCategory};
pub use progress::{ProgressEvent, PullAggregator, PullPayload};
pub use prompt::build_prompt;
pub use routing::{BackendTarget, CallStyle};
pub use validation::DomainValidator;
pub use value_objects::{GenerationStage, ProviderKind};
