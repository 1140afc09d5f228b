//! Policy lookup: override directory first, bundled text second.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use layergen_core::{
    application::{ApplicationError, ports::PolicyStore},
    domain::{GenerationStage, RelativePath},
    error::{LayergenError, LayergenResult},
};

use crate::builtin_policies;

#[derive(Debug, Clone, Default)]
pub struct PolicyCatalog {
    override_dir: Option<PathBuf>,
}

impl PolicyCatalog {
    /// Bundled policies only.
    pub fn bundled() -> Self {
        Self::default()
    }

    pub fn with_override_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: Some(dir.into()),
        }
    }

    /// Use `dir` when given, else `$LAYERGEN_POLICIES_DIR`, else bundled only.
    pub fn from_config(dir: Option<PathBuf>) -> Self {
        Self {
            override_dir: dir.or_else(builtin_policies::dir_from_env),
        }
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.override_dir.as_deref()
    }

    fn read_override(&self, language: &str, stage: GenerationStage) -> LayergenResult<Option<String>> {
        let Some(dir) = &self.override_dir else {
            return Ok(None);
        };

        let path = dir
            .join(language_dir(language)?)
            .join(format!("{}.txt", stage.as_str()));
        if !path.is_file() {
            debug!(path = %path.display(), "No policy override");
            return Ok(None);
        }

        let text = fs::read_to_string(&path).map_err(|e| {
            LayergenError::from(ApplicationError::FilesystemError {
                path: path.clone(),
                reason: format!("Failed to read policy: {e}"),
            })
        })?;
        debug!(path = %path.display(), "Using policy override");
        Ok(Some(text))
    }
}

/// The language as a single directory name under the override directory.
fn language_dir(language: &str) -> LayergenResult<PathBuf> {
    let invalid = || {
        LayergenError::configuration(format!(
            "project language '{language}' is not a valid policy directory name"
        ))
    };

    let relative = RelativePath::try_new(language.trim().to_ascii_lowercase()).map_err(|_| invalid())?;
    if relative.as_path().components().count() != 1 {
        return Err(invalid());
    }
    Ok(relative.as_path().to_path_buf())
}

impl PolicyStore for PolicyCatalog {
    #[instrument(skip(self))]
    fn get(&self, language: &str, stage: GenerationStage) -> LayergenResult<String> {
        if let Some(text) = self.read_override(language, stage)? {
            return Ok(text);
        }

        builtin_policies::bundled(language, stage)
            .map(str::to_string)
            .ok_or_else(|| {
                ApplicationError::MissingPolicy {
                    language: language.to_string(),
                    stage,
                }
                .into()
            })
    }
}
