//! HTTP adapters for model backends.

pub mod ndjson;
mod ollama;
mod openai;

pub use ollama::OllamaBackend;
pub use openai::{DEFAULT_BASE_URL, OpenAiBackend};

use layergen_core::application::ports::TransportError;

/// Normalize a base URL so paths can be appended with `/`.
fn base_url(endpoint: &str) -> &str {
    endpoint.trim_end_matches('/')
}

fn connection_error(err: reqwest::Error) -> TransportError {
    if err.is_decode() {
        TransportError::Decode(err.to_string())
    } else {
        TransportError::Connection(err.to_string())
    }
}

/// Turn a non-success response into a `Status` error, preferring the
/// backend's own error message when the body carries one.
async fn status_error(response: reqwest::Response) -> TransportError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    TransportError::Status {
        status,
        message: error_message(&body).unwrap_or(body),
    }
}

/// `{"error": "..."}` (Ollama) or `{"error": {"message": "..."}}` (OpenAI).
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        serde_json::Value::String(message) => Some(message.clone()),
        other => other
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string),
    }
}
