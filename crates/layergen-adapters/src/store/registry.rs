//! The global provider registry as a TOML file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use layergen_core::{
    application::ports::RegistryStore,
    domain::Registry,
    error::LayergenResult,
};

use super::{dto::LlmSection, store_error};

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    llm: LlmSection,
}

/// Registry persisted at a path chosen by the caller.
///
/// A missing file reads as an empty registry; saving creates parent
/// directories. On Unix the file is written owner-read/write only since it
/// holds API keys.
#[derive(Debug, Clone)]
pub struct TomlRegistryStore {
    path: PathBuf,
}

impl TomlRegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistryStore for TomlRegistryStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> LayergenResult<Registry> {
        if !self.path.exists() {
            debug!("Registry file absent; starting empty");
            return Ok(Registry::new());
        }

        let text = fs::read_to_string(&self.path).map_err(|e| store_error(&self.path, e))?;
        let file: RegistryFile = toml::from_str(&text).map_err(|e| store_error(&self.path, e))?;
        let (default, providers) = file
            .llm
            .providers_into_domain()
            .map_err(|e| store_error(&self.path, e))?;

        Ok(Registry::from_parts(default, providers))
    }

    #[instrument(skip_all, fields(path = %self.path.display(), providers = registry.len()))]
    fn save(&self, registry: &Registry) -> LayergenResult<()> {
        let file = RegistryFile {
            llm: LlmSection::from_domain(registry.default_provider(), registry.providers()),
        };
        let text = toml::to_string_pretty(&file).map_err(|e| store_error(&self.path, e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| store_error(parent, e))?;
            }
        }
        fs::write(&self.path, text).map_err(|e| store_error(&self.path, e))?;
        restrict_permissions(&self.path)?;

        debug!("Registry saved");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> LayergenResult<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| store_error(path, e))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> LayergenResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use layergen_core::application::ApplicationError;
    use layergen_core::domain::{ProviderConfig, ProviderKind};
    use layergen_core::error::LayergenError;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> TomlRegistryStore {
        TomlRegistryStore::new(dir.path().join("layergen/providers.toml"))
    }

    #[test]
    fn missing_file_is_empty_registry() {
        let dir = TempDir::new().unwrap();
        let registry = store(&dir).load().unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.default_provider(), None);
    }

    #[test]
    fn save_then_load_preserves_entries() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let mut registry = Registry::new();
        registry.add_provider(
            ProviderConfig::new("openai", ProviderKind::Cloud)
                .unwrap()
                .with_model("gpt-4o")
                .with_secret("sk-1")
                .with_extra("base_url", "https://example.test/v1"),
        );
        registry.add_provider(ProviderConfig::new("ollama", ProviderKind::Local).unwrap());
        store.save(&registry).unwrap();

        assert_eq!(store.load().unwrap(), registry);
    }

    #[test]
    fn file_uses_documented_layout() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let mut registry = Registry::new();
        registry.add_provider(
            ProviderConfig::new("openai", ProviderKind::Cloud)
                .unwrap()
                .with_secret("sk-1"),
        );
        store.save(&registry).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        let value: toml::Value = toml::from_str(&text).unwrap();
        assert_eq!(value["llm"]["default"].as_str(), Some("openai"));
        assert_eq!(value["llm"]["providers"]["openai"]["type"].as_str(), Some("cloud"));
        assert_eq!(value["llm"]["providers"]["openai"]["api_key"].as_str(), Some("sk-1"));
    }

    #[test]
    fn hand_written_file_without_type_infers_kind() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"
[llm]
default = "ollama"

[llm.providers.ollama]
model = "llama3"
url = "http://gpu-box:11434"
"#,
        )
        .unwrap();

        let registry = store.load().unwrap();
        let ollama = registry.get("ollama").unwrap();
        assert_eq!(ollama.kind(), ProviderKind::Local);
        assert_eq!(ollama.effective_endpoint(), "http://gpu-box:11434");
    }

    #[test]
    fn malformed_file_is_store_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "[llm\ndefault = ").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(
            err,
            LayergenError::Application(ApplicationError::Store { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(&Registry::new()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
