//! Init → domain → layout against a mocked Ollama daemon.

use std::fs;
use std::sync::{Arc, Mutex};

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use layergen_adapters::{
    InMemoryRegistryStore, LocalFilesystem, OllamaBackend, OpenAiBackend, PolicyCatalog,
    TomlProjectStore,
};
use layergen_core::application::ports::{ProgressSink, SinkError};
use layergen_core::prelude::*;

#[derive(Default)]
struct Events(Mutex<Vec<ProgressEvent>>);

impl ProgressSink for Events {
    fn on_progress(&self, event: &ProgressEvent) -> Result<(), SinkError> {
        self.0.lock().unwrap().push(event.clone());
        Ok(())
    }
}

fn ndjson(lines: &[serde_json::Value]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

async fn mock_pull(server: &MockServer) {
    let body = ndjson(&[
        json!({"status": "pulling manifest"}),
        json!({"status": "downloading", "digest": "sha256:a", "total": 100, "completed": 100}),
        json!({"status": "success"}),
    ]);
    Mock::given(method("POST"))
        .and(path("/api/pull"))
        .and(body_partial_json(json!({"model": "deepseek-coder-v2", "stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mock_domain_chat(server: &MockServer) {
    let manifest = json!({
        "files": [{"path": "src/domain/order.py", "content": "class Order:\n    pass\n"}]
    })
    .to_string();
    let (head, tail) = manifest.split_at(manifest.len() / 2);
    let body = ndjson(&[
        json!({"message": {"role": "assistant", "content": head}, "done": false}),
        json!({"message": {"role": "assistant", "content": tail}, "done": false}),
        json!({"message": {"role": "assistant", "content": ""}, "done": true}),
    ]);
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mock_layout_chat(server: &MockServer) {
    let manifest = json!({
        "files": [
            {"path": "src/application/order_service.py", "content": "class OrderService: ..."},
            {"path": "src/interface/api.py", "content": null}
        ]
    })
    .to_string();
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"stream": false})))
        .and(body_string_contains("## src/domain/order.py"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": manifest},
            "done": true
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn local_provider_runs_both_stages() {
    let server = MockServer::start().await;
    mock_pull(&server).await;
    mock_domain_chat(&server).await;
    mock_layout_chat(&server).await;

    let project = tempfile::tempdir().unwrap();
    let mut registry = Registry::new();
    registry.add_provider(
        ProviderConfig::new("ollama", ProviderKind::Local)
            .unwrap()
            .with_endpoint(server.uri()),
    );

    let registry_store: Arc<dyn RegistryStore> =
        Arc::new(InMemoryRegistryStore::with_registry(registry));
    let projects: Arc<dyn ProjectStore> = Arc::new(TomlProjectStore::new());
    let filesystem: Arc<dyn Filesystem> = Arc::new(LocalFilesystem::new());
    let ollama = Arc::new(OllamaBackend::new());

    // init pulls the model and pins the provider.
    let init = ProjectService::new(
        Arc::clone(&registry_store),
        Arc::clone(&projects),
        Arc::clone(&filesystem),
        ProvisioningService::new(ollama.clone()),
    );
    let pull_events = Events::default();
    let outcome = init
        .initialize(project.path(), ProjectSettings::default(), Some(&pull_events))
        .await
        .unwrap();

    assert_eq!(outcome.provider_name, "ollama");
    assert!(outcome.requirements_created);
    assert!(outcome.pull_response.unwrap().contains("success"));
    assert!(pull_events.0.lock().unwrap().iter().any(|event| matches!(
        event,
        ProgressEvent::Pull { total: 100, completed: 100, .. }
    )));

    fs::write(
        project.path().join("requirements.md"),
        "Customers place orders.",
    )
    .unwrap();

    let generation = GenerationService::new(
        Arc::clone(&registry_store),
        Arc::clone(&projects),
        Arc::new(PolicyCatalog::bundled()),
        Arc::clone(&filesystem),
        ProviderDispatcher::new(ollama, Arc::new(OpenAiBackend::new())),
    );

    // Domain stage streams because a sink is attached.
    let chat_events = Events::default();
    let domain = generation
        .generate(GenerationStage::Domain, project.path(), Some(&chat_events))
        .await
        .unwrap();

    assert_eq!(domain.written, vec![project.path().join("src/domain/order.py")]);
    assert_eq!(
        fs::read_to_string(project.path().join("src/domain/order.py")).unwrap(),
        "class Order:\n    pass\n"
    );
    assert!(matches!(
        chat_events.0.lock().unwrap().last(),
        Some(ProgressEvent::Generation { chunks: 2, .. })
    ));

    // Layout stage feeds the domain file back in; no sink, so a blocking chat.
    let layout = generation
        .generate(GenerationStage::Layout, project.path(), None)
        .await
        .unwrap();

    assert_eq!(layout.written.len(), 2);
    assert_eq!(
        fs::read_to_string(project.path().join("src/interface/api.py")).unwrap(),
        ""
    );
}
