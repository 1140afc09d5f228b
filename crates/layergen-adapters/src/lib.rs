//! Infrastructure adapters for Layergen.
//!
//! This crate implements the ports defined in `layergen_core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod backends;
pub mod builtin_policies;
pub mod filesystem;
pub mod policy_catalog;
pub mod store;

// Re-export commonly used adapters
pub use backends::{OllamaBackend, OpenAiBackend};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use policy_catalog::PolicyCatalog;
pub use store::{InMemoryRegistryStore, TomlProjectStore, TomlRegistryStore};
