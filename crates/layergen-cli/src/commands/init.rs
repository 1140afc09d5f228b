//! `layergen init` - pin the default provider into a new project.

use tracing::{debug, instrument};

use layergen_core::domain::{PROJECT_FILE, ProviderKind};

use crate::{
    cli::InitArgs,
    config::AppConfig,
    error::{CliResult, IntoCli, ensure_dir},
    output::OutputManager,
    progress::PullProgress,
    services::Services,
};

#[instrument(skip_all, fields(dir = %args.dir.display()))]
pub async fn execute(
    args: InitArgs,
    config: &AppConfig,
    services: &Services,
    output: &OutputManager,
) -> CliResult<()> {
    let dir = std::path::absolute(&args.dir)
        .with_cli_context(|| format!("resolving project directory {}", args.dir.display()))?;
    ensure_dir(&dir)?;
    let settings = config.project_settings(args.language, args.pattern, args.app);

    let progress = PullProgress::new("checking model", output.is_interactive());
    let outcome = services
        .projects()
        .initialize(&dir, settings.clone(), Some(&progress))
        .await;
    progress.finish();
    let outcome = outcome?;

    if let Some(response) = &outcome.pull_response {
        debug!(response = %response, "Model pull finished");
    }

    output.success(&format!("Created {} in {}", PROJECT_FILE, dir.display()))?;
    output.print(&format!(
        "  Provider:  {} ({}, model {})",
        outcome.provider_name, outcome.kind, outcome.model
    ))?;
    output.print(&format!(
        "  Project:   {} / {} / {}",
        settings.language, settings.pattern, settings.app
    ))?;
    if outcome.kind == ProviderKind::Local && outcome.pull_response.is_some() {
        output.print(&format!("  Model:     {} is available locally", outcome.model))?;
    }

    if outcome.requirements_created {
        output.info(&format!(
            "Describe your system in {}, then run `layergen generate domain`",
            outcome.requirements_file.display()
        ))?;
    } else {
        output.info("Existing requirements kept; run `layergen generate domain` when ready")?;
    }
    Ok(())
}
