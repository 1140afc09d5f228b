use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::{FileManifestEntry, GenerationStage, ProviderConfig};

/// Everything one generation pass needs, resolved and loaded.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub stage: GenerationStage,
    /// Provider with registry secrets already merged in.
    pub provider: ProviderConfig,
    pub requirements: String,
    pub policy: String,
    /// Earlier output keyed by project-relative path.
    pub prior_artifacts: BTreeMap<String, String>,
}

/// Outcome of one generation pass.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub provider_name: String,
    pub entries: Vec<FileManifestEntry>,
    /// Absolute paths actually written, in manifest order.
    pub written: Vec<PathBuf>,
    pub raw_response: String,
}
