//! The user-scoped provider registry.

use std::collections::BTreeMap;

use crate::domain::{DomainError, ProviderConfig, ProviderKind};

/// Every named provider the user has configured, plus the default.
///
/// Invariant: `default_provider`, when set, keys an entry in `providers`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    default_provider: Option<String>,
    providers: BTreeMap<String, ProviderConfig>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted parts.
    ///
    /// A default that names no entry is dropped rather than kept dangling.
    pub fn from_parts(
        default_provider: Option<String>,
        providers: impl IntoIterator<Item = ProviderConfig>,
    ) -> Self {
        let providers: BTreeMap<_, _> = providers
            .into_iter()
            .map(|provider| (provider.name().to_string(), provider))
            .collect();
        let default_provider = default_provider.filter(|name| providers.contains_key(name));

        Self {
            default_provider,
            providers,
        }
    }

    pub fn default_provider(&self) -> Option<&str> {
        self.default_provider.as_deref()
    }

    pub fn providers(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.providers.values()
    }

    pub fn get(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    /// The entry the default points at.
    pub fn default_entry(&self) -> Option<&ProviderConfig> {
        self.default_provider
            .as_deref()
            .and_then(|name| self.providers.get(name))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Insert or fully replace a provider.
    ///
    /// Local providers get the local model and endpoint defaults filled in.
    /// A provider added to an empty registry becomes the default; otherwise
    /// the default is left alone, even when none is set.
    pub fn add_provider(&mut self, provider: ProviderConfig) {
        let provider = match provider.kind() {
            ProviderKind::Local => provider.with_explicit_defaults(),
            ProviderKind::Cloud => provider,
        };
        let name = provider.name().to_string();

        let is_first = self.providers.is_empty();
        if is_first {
            self.default_provider = Some(name.clone());
        }
        self.providers.insert(name, provider);
    }

    pub fn set_default(&mut self, name: &str) -> Result<(), DomainError> {
        if !self.providers.contains_key(name) {
            return Err(DomainError::ProviderNotFound {
                name: name.to_string(),
            });
        }
        self.default_provider = Some(name.to_string());
        Ok(())
    }

    /// Remove a provider. Removing the default leaves no default.
    pub fn remove_provider(&mut self, name: &str) -> Result<ProviderConfig, DomainError> {
        let removed = self
            .providers
            .remove(name)
            .ok_or_else(|| DomainError::ProviderNotFound {
                name: name.to_string(),
            })?;

        if self.default_provider.as_deref() == Some(name) {
            self.default_provider = None;
        }
        Ok(removed)
    }

    /// Secret of the named provider, or of the default when `name` is `None`.
    pub fn get_secret(&self, name: Option<&str>) -> Option<&str> {
        let name = name.or(self.default_provider.as_deref())?;
        self.providers.get(name)?.secret()
    }

    /// Copy suitable for display: every secret masked.
    pub fn redacted(&self) -> Self {
        Self {
            default_provider: self.default_provider.clone(),
            providers: self
                .providers
                .iter()
                .map(|(name, provider)| (name.clone(), provider.redacted()))
                .collect(),
        }
    }
}
