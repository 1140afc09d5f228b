//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `layergen-adapters` implement
//! these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: called by application, implemented by infrastructure
//!   - `Filesystem`: file operations
//!   - `RegistryStore` / `ProjectStore`: configuration persistence
//!   - `PolicyStore`: policy templates
//!   - `LocalBackend` / `ModelPuller` / `CloudBackend`: model calls
//!   - `ProgressSink`: progress callbacks
//!
//! - **Driving (Input) Ports**: called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    ChatMessage, ChatRole, CloudBackend, CloudChatRequest, CloudCompletionRequest, Filesystem,
    LocalBackend, ModelPuller, PolicyStore, ProgressSink, ProjectStore, PullStream,
    RegistryStore, SinkError, TextStream, TransportError,
};

#[cfg(test)]
pub use output::{
    MockCloudBackend, MockFilesystem, MockLocalBackend, MockModelPuller, MockPolicyStore,
    MockProgressSink, MockProjectStore, MockRegistryStore,
};
