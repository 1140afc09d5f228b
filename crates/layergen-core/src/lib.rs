//! Layergen Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Layergen
//! code generation tool, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          layergen-cli (CLI)             │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (GenerationService, RegistryService,    │
//! │  ProjectService, ProvisioningService)   │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Stores, Filesystem, Backends, Sinks)   │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    layergen-adapters (Infrastructure)   │
//! │ (TOML stores, Ollama, OpenAI, LocalFs)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Registry, ProjectConfig, FileManifest, │
//! │  prompt building, backend routing)      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use layergen_core::{
//!     application::GenerationService,
//!     domain::GenerationStage,
//! };
//!
//! // Adapters are injected by the caller (see `layergen-adapters`).
//! let service = GenerationService::new(registry, projects, policies, filesystem, dispatcher);
//! let result = service.generate(GenerationStage::Domain, "./my-app", None).await?;
//! println!("wrote {} files", result.written.len());
//! ```

// Domain layer (stable, well-defined API)
pub mod domain;

// Application layer (orchestration logic)
pub mod application;

// Error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        GenerationService, Materializer, ProjectService, ProviderDispatcher, ProvisioningService,
        RegistryService,
        ports::{
            CloudBackend, Filesystem, LocalBackend, ModelPuller, PolicyStore, ProgressSink,
            ProjectStore, RegistryStore,
        },
    };
    pub use crate::domain::{
        FileManifest, FileManifestEntry, GenerationResult, GenerationStage, ProgressEvent,
        ProjectConfig, ProjectSettings, ProviderConfig, ProviderKind, Registry,
    };
    pub use crate::error::{LayergenError, LayergenResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
