//! Wires adapters into core services from the loaded [`AppConfig`].

use std::sync::Arc;

use layergen_adapters::{
    LocalFilesystem, OllamaBackend, OpenAiBackend, PolicyCatalog, TomlProjectStore,
    TomlRegistryStore,
};
use layergen_core::application::{
    GenerationService, ProjectService, ProviderDispatcher, ProvisioningService, RegistryService,
    ports::{Filesystem, ProjectStore, RegistryStore},
};

use crate::config::AppConfig;

/// Adapters shared by every command of one run.
pub struct Services {
    registry: Arc<dyn RegistryStore>,
    projects: Arc<dyn ProjectStore>,
    filesystem: Arc<dyn Filesystem>,
    policies: PolicyCatalog,
    ollama: OllamaBackend,
    openai: OpenAiBackend,
    config: AppConfig,
}

impl Services {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            registry: Arc::new(TomlRegistryStore::new(config.registry_path.clone())),
            projects: Arc::new(TomlProjectStore::new()),
            filesystem: Arc::new(LocalFilesystem::new()),
            policies: PolicyCatalog::from_config(config.policies.dir.clone()),
            ollama: OllamaBackend::new().with_chat_timeout(config.http_timeout()),
            openai: OpenAiBackend::new().with_timeout(config.http_timeout()),
            config: config.clone(),
        }
    }

    pub fn registry(&self) -> RegistryService {
        RegistryService::new(Arc::clone(&self.registry))
    }

    /// Human-readable location of the registry file.
    pub fn registry_location(&self) -> String {
        self.registry.location()
    }

    pub fn projects(&self) -> ProjectService {
        let provisioning = ProvisioningService::new(Arc::new(self.ollama.clone()))
            .with_timeout(self.config.pull_timeout());

        ProjectService::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.projects),
            Arc::clone(&self.filesystem),
            provisioning,
        )
    }

    pub fn generation(&self) -> GenerationService {
        let dispatcher = ProviderDispatcher::new(
            Arc::new(self.ollama.clone()),
            Arc::new(self.openai.clone()),
        );

        GenerationService::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.projects),
            Arc::new(self.policies.clone()),
            Arc::clone(&self.filesystem),
            dispatcher,
        )
    }
}
