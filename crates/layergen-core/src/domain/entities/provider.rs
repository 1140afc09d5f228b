//! Named LLM provider configuration.

use std::collections::BTreeMap;

use crate::domain::{DomainError, ProviderKind};

/// Keys in [`ProviderConfig::extra`] that hold secrets.
pub const SENSITIVE_FIELDS: &[&str] = &["api_secret", "token", "password"];

/// Extra key that overrides the cloud endpoint.
pub const BASE_URL_FIELD: &str = "base_url";

/// What secrets render as in user-facing listings.
pub const REDACTED: &str = "******** (set)";

/// One provider entry, as stored in the registry or a project file.
///
/// The kind is fixed at construction. Model and endpoint are optional and
/// fall back to per-kind defaults through [`effective_model`] and
/// [`effective_endpoint`].
///
/// [`effective_model`]: ProviderConfig::effective_model
/// [`effective_endpoint`]: ProviderConfig::effective_endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    name: String,
    kind: ProviderKind,
    model: Option<String>,
    endpoint: Option<String>,
    secret: Option<String>,
    extra: BTreeMap<String, String>,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, kind: ProviderKind) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidProvider(
                "provider name cannot be empty".into(),
            ));
        }
        if trimmed.contains(['.', '"', '[', ']']) {
            return Err(DomainError::InvalidProvider(format!(
                "provider name '{trimmed}' may not contain '.', '\"', '[' or ']'"
            )));
        }

        Ok(Self {
            name: trimmed.to_string(),
            kind,
            model: None,
            endpoint: None,
            secret: None,
            extra: BTreeMap::new(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = non_blank(model.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = non_blank(endpoint.into());
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = non_blank(secret.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    pub fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }

    pub fn effective_model(&self) -> &str {
        self.model().unwrap_or_else(|| self.kind.default_model())
    }

    pub fn effective_endpoint(&self) -> &str {
        self.endpoint().unwrap_or_else(|| self.kind.default_endpoint())
    }

    /// Endpoint override for cloud calls, if any was configured.
    ///
    /// `None` means "use the backend's own default".
    pub fn cloud_endpoint(&self) -> Option<&str> {
        self.endpoint()
            .or_else(|| self.extra.get(BASE_URL_FIELD).map(String::as_str))
    }

    /// The secret used to authenticate, falling back to sensitive aliases.
    pub fn resolved_secret(&self) -> Option<&str> {
        self.secret().or_else(|| {
            SENSITIVE_FIELDS
                .iter()
                .find_map(|key| self.extra.get(*key).map(String::as_str))
        })
    }

    pub fn has_secret(&self) -> bool {
        self.resolved_secret().is_some()
    }

    /// Copy with `secret` and every sensitive alias removed.
    pub fn without_secrets(&self) -> Self {
        let mut stripped = self.clone();
        stripped.secret = None;
        stripped
            .extra
            .retain(|key, _| !SENSITIVE_FIELDS.contains(&key.as_str()));
        stripped
    }

    /// Copy with every secret replaced by [`REDACTED`].
    pub fn redacted(&self) -> Self {
        let mut redacted = self.clone();
        if redacted.secret.is_some() {
            redacted.secret = Some(REDACTED.to_string());
        }
        for (key, value) in &mut redacted.extra {
            if SENSITIVE_FIELDS.contains(&key.as_str()) {
                *value = REDACTED.to_string();
            }
        }
        redacted
    }

    /// Copy with model and endpoint filled from the kind defaults.
    ///
    /// Cloud endpoints stay unset so the backend default (or `base_url`)
    /// keeps applying.
    pub fn with_explicit_defaults(&self) -> Self {
        let mut explicit = self.clone();
        if explicit.model.is_none() {
            explicit.model = Some(self.kind.default_model().to_string());
        }
        if explicit.endpoint.is_none() && self.kind == ProviderKind::Local {
            explicit.endpoint = Some(self.kind.default_endpoint().to_string());
        }
        explicit
    }

    /// Fill secret fields from `source` wherever this entry lacks them.
    ///
    /// Returns `true` when this entry already held a secret that differs
    /// from the one in `source`.
    pub fn merge_secrets_from(&mut self, source: &ProviderConfig) -> bool {
        let mut shadowed = false;

        match (&self.secret, &source.secret) {
            (None, Some(secret)) => self.secret = Some(secret.clone()),
            (Some(own), Some(other)) if own != other => shadowed = true,
            _ => {}
        }

        for key in SENSITIVE_FIELDS {
            match (self.extra.get(*key), source.extra.get(*key)) {
                (None, Some(value)) => {
                    self.extra.insert((*key).to_string(), value.clone());
                }
                (Some(own), Some(other)) if own != other => shadowed = true,
                _ => {}
            }
        }

        shadowed
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
