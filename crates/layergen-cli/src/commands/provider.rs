//! `layergen provider` - manage the global provider registry.

use serde_json::{Map, Value, json};
use tracing::instrument;

use layergen_core::{
    domain::{BASE_URL_FIELD, ProviderConfig, ProviderKind, Registry},
    error::LayergenError,
};

use crate::{
    cli::{KindArg, OutputFormat, ProviderAddArgs, ProviderCommands},
    error::CliResult,
    output::OutputManager,
    services::Services,
};

/// Dispatch to the correct provider subcommand.
pub fn execute(cmd: ProviderCommands, services: &Services, output: &OutputManager) -> CliResult<()> {
    match cmd {
        ProviderCommands::Add(args) => add(args, services, output),
        ProviderCommands::SetDefault { name } => {
            services.registry().set_default(&name)?;
            output.success(&format!("Default provider is now '{name}'"))?;
            Ok(())
        }
        ProviderCommands::Remove { name } => {
            let was_default = services.registry().remove_provider(&name)?;
            output.success(&format!("Removed provider '{name}'"))?;
            if was_default {
                output.warning(
                    "No default provider is set; choose one with `layergen provider set-default <NAME>`",
                )?;
            }
            Ok(())
        }
        ProviderCommands::Show => show(services, output),
    }
}

#[instrument(skip_all, fields(provider = %args.name))]
fn add(args: ProviderAddArgs, services: &Services, output: &OutputManager) -> CliResult<()> {
    let provider = build_provider(args)?;
    let service = services.registry();

    let stored = service.add_provider(provider)?;
    output.success(&format!(
        "Saved provider '{}' ({}, model {})",
        stored.name(),
        stored.kind(),
        stored.effective_model()
    ))?;

    if service.load()?.default_provider() == Some(stored.name()) {
        output.info(&format!("'{}' is the default provider", stored.name()))?;
    }
    if stored.kind() == ProviderKind::Cloud && !stored.has_secret() {
        output.warning("No API key stored; generation will fail until one is added with --api-key")?;
    }
    Ok(())
}

fn build_provider(args: ProviderAddArgs) -> Result<ProviderConfig, LayergenError> {
    let kind = args
        .kind
        .map(convert_kind)
        .unwrap_or_else(|| ProviderKind::infer_from_name(&args.name));

    let mut provider = ProviderConfig::new(args.name, kind)?;
    if let Some(model) = args.model {
        provider = provider.with_model(model);
    }
    if let Some(url) = args.url {
        provider = provider.with_endpoint(url);
    }
    if let Some(key) = args.api_key {
        provider = provider.with_secret(key);
    }
    if let Some(base_url) = args.base_url {
        provider = provider.with_extra(BASE_URL_FIELD, base_url);
    }
    Ok(provider)
}

fn convert_kind(kind: KindArg) -> ProviderKind {
    match kind {
        KindArg::Local => ProviderKind::Local,
        KindArg::Cloud => ProviderKind::Cloud,
    }
}

fn show(services: &Services, output: &OutputManager) -> CliResult<()> {
    let registry = services.registry().show()?;

    if output.format() == OutputFormat::Json {
        output.json(&registry_json(&registry))?;
        return Ok(());
    }

    output.header(&format!("Providers ({})", services.registry_location()))?;
    if registry.is_empty() {
        output.info("No providers configured; add one with `layergen provider add <NAME>`")?;
        return Ok(());
    }

    for provider in registry.providers() {
        let marker = if registry.default_provider() == Some(provider.name()) {
            "*"
        } else {
            " "
        };
        output.print(&format!("{marker} {} ({})", provider.name(), provider.kind()))?;
        for (key, value) in provider_fields(provider) {
            output.print(&format!("    {key:<10} {value}"))?;
        }
    }
    Ok(())
}

/// Displayable fields of an already redacted provider.
fn provider_fields(provider: &ProviderConfig) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    if let Some(model) = provider.model() {
        fields.push(("model".to_string(), model.to_string()));
    }
    if let Some(url) = provider.endpoint() {
        fields.push(("url".to_string(), url.to_string()));
    }
    if let Some(secret) = provider.secret() {
        fields.push(("api_key".to_string(), secret.to_string()));
    }
    for (key, value) in provider.extra() {
        fields.push((key.clone(), value.clone()));
    }
    fields
}

fn registry_json(registry: &Registry) -> Value {
    let providers: Map<String, Value> = registry
        .providers()
        .map(|provider| {
            let mut entry = Map::new();
            entry.insert("type".into(), json!(provider.kind().as_str()));
            for (key, value) in provider_fields(provider) {
                entry.insert(key, Value::String(value));
            }
            (provider.name().to_string(), Value::Object(entry))
        })
        .collect();

    json!({
        "default": registry.default_provider(),
        "providers": providers,
    })
}
