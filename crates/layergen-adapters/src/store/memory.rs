use std::sync::{Arc, RwLock};

use layergen_core::{
    application::{ApplicationError, ports::RegistryStore},
    domain::Registry,
    error::LayergenResult,
};

/// Registry held in memory, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistryStore {
    inner: Arc<RwLock<Registry>>,
}

impl InMemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }
}

impl RegistryStore for InMemoryRegistryStore {
    fn load(&self) -> LayergenResult<Registry> {
        let registry = self.inner.read().map_err(|_| ApplicationError::StoreLockError)?;
        Ok(registry.clone())
    }

    fn save(&self, registry: &Registry) -> LayergenResult<()> {
        let mut current = self.inner.write().map_err(|_| ApplicationError::StoreLockError)?;
        *current = registry.clone();
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".into()
    }
}
