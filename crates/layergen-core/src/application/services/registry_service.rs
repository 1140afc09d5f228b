//! Registry Service - provider registry use cases.
//!
//! Every mutation is a read-modify-write against the store, so the file on
//! disk is the only state.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    application::ports::RegistryStore,
    domain::{DomainValidator as validator, ProviderConfig, Registry},
    error::{LayergenError, LayergenResult},
};

pub struct RegistryService {
    store: Arc<dyn RegistryStore>,
}

impl RegistryService {
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> LayergenResult<Registry> {
        self.store.load()
    }

    /// Insert or replace a provider. Returns the stored entry.
    #[instrument(skip_all, fields(provider = %provider.name(), kind = %provider.kind()))]
    pub fn add_provider(&self, provider: ProviderConfig) -> LayergenResult<ProviderConfig> {
        let name = provider.name().to_string();
        let stored = self.modify(|registry| {
            registry.add_provider(provider);
            Ok(())
        })?;

        info!(store = %self.store.location(), "Provider saved");
        stored
            .get(&name)
            .cloned()
            .ok_or_else(|| LayergenError::Internal {
                message: format!("provider '{name}' missing right after insert"),
            })
    }

    #[instrument(skip(self))]
    pub fn set_default(&self, name: &str) -> LayergenResult<()> {
        self.modify(|registry| registry.set_default(name).map_err(Into::into))?;
        info!("Default provider updated");
        Ok(())
    }

    /// Remove a provider. Returns whether it was the default.
    #[instrument(skip(self))]
    pub fn remove_provider(&self, name: &str) -> LayergenResult<bool> {
        let was_default = self.store.load()?.default_provider() == Some(name);
        self.modify(|registry| registry.remove_provider(name).map(drop).map_err(Into::into))?;
        info!(was_default, "Provider removed");
        Ok(was_default)
    }

    /// Secret of the named provider, or of the default.
    pub fn get_secret(&self, name: Option<&str>) -> LayergenResult<Option<String>> {
        Ok(self.store.load()?.get_secret(name).map(str::to_string))
    }

    /// Redacted snapshot for display.
    pub fn show(&self) -> LayergenResult<Registry> {
        Ok(self.store.load()?.redacted())
    }

    fn modify(
        &self,
        change: impl FnOnce(&mut Registry) -> LayergenResult<()>,
    ) -> LayergenResult<Registry> {
        let mut registry = self.store.load()?;
        change(&mut registry)?;
        validator::validate_registry(&registry)?;
        self.store.save(&registry)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockRegistryStore;
    use crate::application::services::test_support::FakeRegistryStore;
    use crate::domain::{DomainError, ProviderKind, REDACTED};

    fn service(store: &FakeRegistryStore) -> RegistryService {
        RegistryService::new(Arc::new(store.clone()))
    }

    fn cloud(name: &str) -> ProviderConfig {
        ProviderConfig::new(name, ProviderKind::Cloud)
            .unwrap()
            .with_secret(format!("sk-{name}"))
    }

    #[test]
    fn add_persists_and_promotes_first_provider() {
        let store = FakeRegistryStore::default();
        let service = service(&store);

        service.add_provider(cloud("openai")).unwrap();
        service.add_provider(cloud("groq")).unwrap();

        let registry = store.current();
        assert_eq!(registry.default_provider(), Some("openai"));
        assert_eq!(registry.len(), 2);
        assert_eq!(*store.saves.lock().unwrap(), 2);
    }

    #[test]
    fn add_local_returns_entry_with_defaults() {
        let store = FakeRegistryStore::default();
        let stored = service(&store)
            .add_provider(ProviderConfig::new("ollama", ProviderKind::Local).unwrap())
            .unwrap();
        assert_eq!(stored.model(), Some("deepseek-coder-v2"));
    }

    #[test]
    fn remove_default_reports_it_and_leaves_no_default() {
        let store = FakeRegistryStore::default();
        let service = service(&store);
        service.add_provider(cloud("openai")).unwrap();
        service.add_provider(cloud("groq")).unwrap();

        assert!(service.remove_provider("openai").unwrap());
        assert_eq!(store.current().default_provider(), None);
        assert!(!service.remove_provider("groq").unwrap());
    }

    #[test]
    fn failed_mutation_does_not_save() {
        let store = FakeRegistryStore::default();
        let service = service(&store);

        let err = service.set_default("ghost").unwrap_err();
        assert!(matches!(
            err,
            LayergenError::Domain(DomainError::ProviderNotFound { .. })
        ));
        assert_eq!(*store.saves.lock().unwrap(), 0);
    }

    #[test]
    fn show_redacts_but_store_keeps_secret() {
        let store = FakeRegistryStore::default();
        let service = service(&store);
        service.add_provider(cloud("openai")).unwrap();

        let shown = service.show().unwrap();
        assert_eq!(shown.get("openai").unwrap().secret(), Some(REDACTED));
        assert_eq!(
            service.get_secret(None).unwrap().as_deref(),
            Some("sk-openai")
        );
    }

    #[test]
    fn store_errors_propagate() {
        let mut store = MockRegistryStore::new();
        store.expect_load().returning(|| {
            Err(LayergenError::configuration("registry file is corrupt"))
        });
        store.expect_save().never();

        let service = RegistryService::new(Arc::new(store));
        let err = service.add_provider(cloud("openai")).unwrap_err();
        assert!(matches!(err, LayergenError::Configuration { .. }));
    }
}
