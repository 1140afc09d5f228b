//! Serde shapes of the on-disk TOML files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use layergen_core::domain::{DomainError, ProviderConfig, ProviderKind};

/// The `[llm]` table.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct LlmSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderEntry>,
}

/// One `[llm.providers.NAME]` table.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct ProviderEntry {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Unknown keys. Only string values reach the domain.
    #[serde(flatten)]
    pub extra: BTreeMap<String, toml::Value>,
}

impl ProviderEntry {
    /// Entries without a `type` get one inferred from the name.
    pub fn into_domain(self, name: &str) -> Result<ProviderConfig, DomainError> {
        let kind = match self.kind.as_deref() {
            Some(kind) => kind.parse()?,
            None => ProviderKind::infer_from_name(name),
        };

        let mut provider = ProviderConfig::new(name, kind)?;
        if let Some(model) = self.model {
            provider = provider.with_model(model);
        }
        if let Some(url) = self.url {
            provider = provider.with_endpoint(url);
        }
        if let Some(api_key) = self.api_key {
            provider = provider.with_secret(api_key);
        }
        for (key, value) in self.extra {
            match value {
                toml::Value::String(value) => provider = provider.with_extra(key, value),
                other => debug!(
                    provider = name,
                    key = %key,
                    kind = other.type_str(),
                    "ignoring non-string provider field"
                ),
            }
        }
        Ok(provider)
    }

    pub fn from_domain(provider: &ProviderConfig) -> Self {
        Self {
            kind: Some(provider.kind().to_string()),
            model: provider.model().map(str::to_string),
            url: provider.endpoint().map(str::to_string),
            api_key: provider.secret().map(str::to_string),
            extra: provider
                .extra()
                .iter()
                .map(|(key, value)| (key.clone(), toml::Value::String(value.clone())))
                .collect(),
        }
    }
}

impl LlmSection {
    pub fn providers_into_domain(self) -> Result<(Option<String>, Vec<ProviderConfig>), DomainError> {
        let providers = self
            .providers
            .into_iter()
            .map(|(name, entry)| entry.into_domain(&name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((self.default, providers))
    }

    pub fn from_domain<'a>(
        default: Option<&str>,
        providers: impl IntoIterator<Item = &'a ProviderConfig>,
    ) -> Self {
        Self {
            default: default.map(str::to_string),
            providers: providers
                .into_iter()
                .map(|p| (p.name().to_string(), ProviderEntry::from_domain(p)))
                .collect(),
        }
    }
}
