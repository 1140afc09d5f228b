//! Generation Service - one pass of the generation pipeline.
//!
//! 1. Load the project file and resolve its provider (registry secrets merged)
//! 2. Read the requirements document
//! 3. Load the policy for the project language and stage
//! 4. Collect prior artifacts (layout stage only)
//! 5. Build the prompt, dispatch it, materialize the response

use std::collections::BTreeMap;
use std::path::{Component, Path};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        error::resolution_error,
        ports::{Filesystem, PolicyStore, ProgressSink, ProjectStore, RegistryStore},
        services::{Materializer, ProviderDispatcher},
    },
    domain::{
        FileManifest, GenerationRequest, GenerationResult, GenerationStage, REQUIREMENTS_FILE,
        build_prompt, resolve_provider, value_objects::source_extension,
    },
    error::LayergenResult,
};

pub struct GenerationService {
    registry: Arc<dyn RegistryStore>,
    projects: Arc<dyn ProjectStore>,
    policies: Arc<dyn PolicyStore>,
    filesystem: Arc<dyn Filesystem>,
    dispatcher: ProviderDispatcher,
    materializer: Materializer,
}

impl GenerationService {
    pub fn new(
        registry: Arc<dyn RegistryStore>,
        projects: Arc<dyn ProjectStore>,
        policies: Arc<dyn PolicyStore>,
        filesystem: Arc<dyn Filesystem>,
        dispatcher: ProviderDispatcher,
    ) -> Self {
        let materializer = Materializer::new(Arc::clone(&filesystem));
        Self {
            registry,
            projects,
            policies,
            filesystem,
            dispatcher,
            materializer,
        }
    }

    /// Run one full stage against `project_dir`.
    pub async fn generate(
        &self,
        stage: GenerationStage,
        project_dir: &Path,
        sink: Option<&dyn ProgressSink>,
    ) -> LayergenResult<GenerationResult> {
        let request = self.prepare(stage, project_dir)?;
        self.execute(&request, project_dir, sink).await
    }

    /// Load and resolve every input of a stage without calling a model.
    #[instrument(skip_all, fields(stage = %stage, project = %project_dir.display()))]
    pub fn prepare(&self, stage: GenerationStage, project_dir: &Path) -> LayergenResult<GenerationRequest> {
        let project = self.projects.load(project_dir)?;
        let registry = self.registry.load()?;
        let provider = resolve_provider(&project, &registry).map_err(resolution_error)?;
        info!(provider = %provider.name(), model = %provider.effective_model(), "Provider resolved");

        let requirements = self.read_requirements(project_dir)?;
        let policy = self.policies.get(&project.settings.language, stage)?;
        debug!(policy_len = policy.len(), "Policy loaded");

        let prior_artifacts = match stage.prior_artifact_dir() {
            Some(dir) => self.collect_artifacts(project_dir, dir, &project.settings.language)?,
            None => BTreeMap::new(),
        };
        debug!(artifacts = prior_artifacts.len(), "Prior artifacts collected");

        Ok(GenerationRequest {
            stage,
            provider,
            requirements,
            policy,
            prior_artifacts,
        })
    }

    /// The exact prompt `execute` will send.
    pub fn render_prompt(&self, request: &GenerationRequest) -> String {
        build_prompt(
            request.stage,
            &request.policy,
            &request.requirements,
            &request.prior_artifacts,
        )
    }

    /// Dispatch a prepared request and write the files it yields.
    #[instrument(skip_all, fields(stage = %request.stage, provider = %request.provider.name()))]
    pub async fn execute(
        &self,
        request: &GenerationRequest,
        project_dir: &Path,
        sink: Option<&dyn ProgressSink>,
    ) -> LayergenResult<GenerationResult> {
        let prompt = self.render_prompt(request);
        let raw_response = self.dispatcher.dispatch(&request.provider, &prompt, sink).await?;

        let manifest = FileManifest::parse(&raw_response)?;
        let written = self.materializer.write_manifest(&manifest, project_dir)?;
        info!(files = written.len(), "Generation complete");

        Ok(GenerationResult {
            provider_name: request.provider.name().to_string(),
            entries: manifest.into_entries(),
            written,
            raw_response,
        })
    }

    fn read_requirements(&self, project_dir: &Path) -> LayergenResult<String> {
        let path = project_dir.join(REQUIREMENTS_FILE);
        if !self.filesystem.exists(&path) {
            return Err(ApplicationError::MissingRequirements { path }.into());
        }

        let content = self.filesystem.read_to_string(&path)?;
        if content.trim().is_empty() {
            return Err(ApplicationError::EmptyRequirements { path }.into());
        }
        Ok(content)
    }

    /// Source files under `project_dir/dir`, keyed by project-relative path.
    ///
    /// Dot-files, `__pycache__` and unreadable files are skipped.
    fn collect_artifacts(
        &self,
        project_dir: &Path,
        dir: &str,
        language: &str,
    ) -> LayergenResult<BTreeMap<String, String>> {
        let extension = source_extension(language);
        let mut artifacts = BTreeMap::new();

        for path in self.filesystem.list_files(&project_dir.join(dir))? {
            let Ok(relative) = path.strip_prefix(project_dir) else {
                continue;
            };
            if is_ignored(relative) {
                continue;
            }
            if let Some(extension) = extension {
                if relative.extension().and_then(|e| e.to_str()) != Some(extension) {
                    continue;
                }
            }

            match self.filesystem.read_to_string(&path) {
                Ok(content) => {
                    let key = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    artifacts.insert(key, content);
                }
                Err(err) => warn!(path = %path.display(), error = %err, "Skipping unreadable artifact"),
            }
        }

        Ok(artifacts)
    }
}

fn is_ignored(relative: &Path) -> bool {
    let hidden_name = relative
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'));

    hidden_name
        || relative
            .components()
            .any(|c| matches!(c, Component::Normal(part) if part == "__pycache__"))
}
