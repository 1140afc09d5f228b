//! Application layer for Layergen.
//!
//! This layer contains:
//! - **Services**: use case orchestration (generation, registry, project init)
//! - **Ports**: interface definitions (traits) for external dependencies
//! - **Errors**: application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business rules itself. Those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    GenerationService, InitOutcome, Materializer, ProjectService, ProviderDispatcher,
    ProvisioningService, RegistryService, DEFAULT_PULL_TIMEOUT,
};

pub use ports::{
    CloudBackend, Filesystem, LocalBackend, ModelPuller, PolicyStore, ProgressSink, ProjectStore,
    RegistryStore,
};

pub use error::ApplicationError;
