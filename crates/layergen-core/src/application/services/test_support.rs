//! In-memory fakes shared by the service tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::application::ApplicationError;
use crate::application::ports::{Filesystem, ProgressSink, RegistryStore, SinkError};
use crate::domain::{ProgressEvent, Registry};
use crate::error::LayergenResult;

/// Flat map of absolute path to content. Directories are implied.
#[derive(Default, Clone)]
pub struct FakeFs {
    pub files: Arc<Mutex<BTreeMap<PathBuf, String>>>,
    pub writes: Arc<Mutex<usize>>,
    /// Writes to this path fail.
    pub fail_on: Option<PathBuf>,
}

impl FakeFs {
    pub fn with_file(self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.files.lock().unwrap().insert(path.into(), content.to_string());
        self
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.lock().unwrap().get(path.as_ref()).cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<PathBuf, String> {
        self.files.lock().unwrap().clone()
    }
}

impl Filesystem for FakeFs {
    fn create_dir_all(&self, _path: &Path) -> LayergenResult<()> {
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> LayergenResult<()> {
        if self.fail_on.as_deref() == Some(path) {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "disk full".into(),
            }
            .into());
        }
        *self.writes.lock().unwrap() += 1;
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> LayergenResult<String> {
        self.read(path).ok_or_else(|| {
            ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "not found".into(),
            }
            .into()
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files
            .lock()
            .unwrap()
            .keys()
            .any(|file| file == path || file.starts_with(path))
    }

    fn list_files(&self, dir: &Path) -> LayergenResult<Vec<PathBuf>> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .keys()
            .filter(|file| file.starts_with(dir))
            .cloned()
            .collect())
    }
}

/// Registry held in memory; every save replaces it.
#[derive(Default, Clone)]
pub struct FakeRegistryStore {
    pub registry: Arc<Mutex<Registry>>,
    pub saves: Arc<Mutex<usize>>,
}

impl FakeRegistryStore {
    pub fn with(registry: Registry) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
            saves: Arc::default(),
        }
    }

    pub fn current(&self) -> Registry {
        self.registry.lock().unwrap().clone()
    }
}

impl RegistryStore for FakeRegistryStore {
    fn load(&self) -> LayergenResult<Registry> {
        Ok(self.current())
    }

    fn save(&self, registry: &Registry) -> LayergenResult<()> {
        *self.saves.lock().unwrap() += 1;
        *self.registry.lock().unwrap() = registry.clone();
        Ok(())
    }

    fn location(&self) -> String {
        "memory".into()
    }
}

/// Records every event it receives.
#[derive(Default, Clone)]
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn on_progress(&self, event: &ProgressEvent) -> Result<(), SinkError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Fails on every event.
pub struct FailingSink;

impl ProgressSink for FailingSink {
    fn on_progress(&self, _event: &ProgressEvent) -> Result<(), SinkError> {
        Err("terminal went away".into())
    }
}
