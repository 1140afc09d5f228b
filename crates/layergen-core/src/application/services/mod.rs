//! Application services - orchestrate use cases.

pub mod dispatcher;
pub mod generation_service;
pub mod materializer;
pub mod project_service;
pub mod provisioning_service;
pub mod registry_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use dispatcher::ProviderDispatcher;
pub use generation_service::GenerationService;
pub use materializer::Materializer;
pub use project_service::{InitOutcome, ProjectService};
pub use provisioning_service::{DEFAULT_PULL_TIMEOUT, ProvisioningService};
pub use registry_service::RegistryService;
