//! `layergen generate` - run one generation stage.

use std::path::Path;

use serde_json::json;
use tracing::{info, instrument};

use layergen_core::domain::{GenerationResult, GenerationStage};

use crate::{
    cli::{GenerateArgs, OutputFormat, StageArg},
    error::{CliResult, IntoCli, ensure_dir},
    output::OutputManager,
    progress::GenerationProgress,
    services::Services,
};

#[instrument(skip_all, fields(stage = ?args.stage, dir = %args.dir.display()))]
pub async fn execute(args: GenerateArgs, services: &Services, output: &OutputManager) -> CliResult<()> {
    let dir = std::path::absolute(&args.dir)
        .with_cli_context(|| format!("resolving project directory {}", args.dir.display()))?;
    ensure_dir(&dir)?;
    let stage = convert_stage(args.stage);
    let service = services.generation();

    let request = service.prepare(stage, &dir)?;
    if args.debug {
        output.header("Prompt:")?;
        output.print(&service.render_prompt(&request))?;
    }

    let progress = GenerationProgress::new(
        &format!(
            "generating {stage} with {} ({})",
            request.provider.name(),
            request.provider.effective_model()
        ),
        output.is_interactive(),
    );
    let result = service.execute(&request, &dir, Some(&progress)).await;
    progress.finish();
    let result = result?;

    if args.debug {
        output.header("Raw response:")?;
        output.print(&result.raw_response)?;
    }
    info!(files = result.written.len(), "Stage written");

    report(stage, &result, &dir, output)
}

fn report(
    stage: GenerationStage,
    result: &GenerationResult,
    dir: &Path,
    output: &OutputManager,
) -> CliResult<()> {
    let files: Vec<String> = result
        .written
        .iter()
        .map(|path| display_path(path, dir))
        .collect();

    if output.format() == OutputFormat::Json {
        output.json(&json!({
            "stage": stage.as_str(),
            "provider": result.provider_name,
            "files": files,
        }))?;
        return Ok(());
    }

    output.success(&format!(
        "Generated {} file(s) for the {stage} stage",
        files.len()
    ))?;
    for file in &files {
        output.print(&format!("  {file}"))?;
    }

    if stage == GenerationStage::Domain {
        output.info("Next: layergen generate layout")?;
    }
    Ok(())
}

fn convert_stage(stage: StageArg) -> GenerationStage {
    match stage {
        StageArg::Domain => GenerationStage::Domain,
        StageArg::Layout => GenerationStage::Layout,
    }
}

fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn stages_convert() {
        assert_eq!(convert_stage(StageArg::Domain), GenerationStage::Domain);
        assert_eq!(convert_stage(StageArg::Layout), GenerationStage::Layout);
    }

    #[test]
    fn written_paths_are_shown_relative_to_the_project() {
        let root = PathBuf::from("/work/app");
        assert_eq!(
            display_path(&root.join("src/domain/order.py"), &root),
            PathBuf::from("src/domain/order.py").display().to_string()
        );
        assert_eq!(display_path(Path::new("/elsewhere/x.py"), &root), "/elsewhere/x.py");
    }
}
