//! Project Service - initializes a project directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, ProgressSink, ProjectStore, RegistryStore},
        services::ProvisioningService,
    },
    domain::{PROJECT_FILE, ProjectConfig, ProjectSettings, ProviderKind, REQUIREMENTS_FILE},
    error::{LayergenError, LayergenResult},
};

/// What `initialize` did.
#[derive(Debug, Clone)]
pub struct InitOutcome {
    pub provider_name: String,
    pub kind: ProviderKind,
    pub model: String,
    pub project_file: PathBuf,
    pub requirements_file: PathBuf,
    /// `false` when a requirements document was already present.
    pub requirements_created: bool,
    /// Final pull response, for local providers.
    pub pull_response: Option<String>,
}

pub struct ProjectService {
    registry: Arc<dyn RegistryStore>,
    projects: Arc<dyn ProjectStore>,
    filesystem: Arc<dyn Filesystem>,
    provisioning: ProvisioningService,
}

impl ProjectService {
    pub fn new(
        registry: Arc<dyn RegistryStore>,
        projects: Arc<dyn ProjectStore>,
        filesystem: Arc<dyn Filesystem>,
        provisioning: ProvisioningService,
    ) -> Self {
        Self {
            registry,
            projects,
            filesystem,
            provisioning,
        }
    }

    /// Pin the registry's default provider into a new project file.
    ///
    /// Local models are pulled first; a cloud default must have a secret.
    #[instrument(skip_all, fields(project = %project_dir.display(), language = %settings.language))]
    pub async fn initialize(
        &self,
        project_dir: &Path,
        settings: ProjectSettings,
        sink: Option<&dyn ProgressSink>,
    ) -> LayergenResult<InitOutcome> {
        let project_file = project_dir.join(PROJECT_FILE);
        if self.filesystem.exists(&project_file) {
            return Err(ApplicationError::ProjectExists { path: project_file }.into());
        }

        let registry = self.registry.load()?;
        let provider = registry.default_entry().cloned().ok_or_else(|| {
            LayergenError::configuration(format!(
                "no default provider in {}; add a provider first (layergen provider add <NAME>)",
                self.registry.location()
            ))
        })?;
        info!(provider = %provider.name(), kind = %provider.kind(), "Using default provider");

        let provider = provider.with_explicit_defaults();
        let pull_response = match provider.kind() {
            ProviderKind::Cloud => {
                if !provider.has_secret() {
                    return Err(ApplicationError::MissingSecret {
                        provider: provider.name().to_string(),
                    }
                    .into());
                }
                None
            }
            ProviderKind::Local => Some(
                self.provisioning
                    .ensure_model(provider.effective_model(), provider.effective_endpoint(), sink)
                    .await?,
            ),
        };

        let outcome_provider = provider.without_secrets();
        let project = ProjectConfig::new(settings, provider);
        let project_file = self.projects.create(project_dir, &project)?;

        let requirements_file = project_dir.join(REQUIREMENTS_FILE);
        let requirements_created = !self.filesystem.exists(&requirements_file);
        if requirements_created {
            self.filesystem.create_dir_all(project_dir)?;
            self.filesystem.write_file(&requirements_file, "")?;
        }

        info!(file = %project_file.display(), "Project initialized");
        Ok(InitOutcome {
            provider_name: outcome_provider.name().to_string(),
            kind: outcome_provider.kind(),
            model: outcome_provider.effective_model().to_string(),
            project_file,
            requirements_file,
            requirements_created,
            pull_response,
        })
    }
}
