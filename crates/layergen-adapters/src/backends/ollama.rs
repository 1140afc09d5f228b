//! Ollama-compatible local backend: chat and model pulls.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use layergen_core::application::ports::{
    ChatMessage, LocalBackend, ModelPuller, PullStream, TextStream, TransportError,
};
use layergen_core::domain::PullPayload;

use super::{base_url, connection_error, ndjson, status_error};

/// HTTP client for an Ollama daemon.
///
/// The endpoint is passed per call, so one instance serves every local
/// provider. `chat_timeout` bounds chat requests only; pulls are bounded by
/// the provisioning service.
#[derive(Debug, Clone, Default)]
pub struct OllamaBackend {
    client: Client,
    chat_timeout: Option<Duration>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    message: Option<ReplyMessage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}

#[derive(Serialize)]
struct PullBody<'a> {
    model: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct PullLine {
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    payload: PullPayload,
}

impl OllamaBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chat_timeout(mut self, timeout: Duration) -> Self {
        self.chat_timeout = Some(timeout);
        self
    }

    async fn post_chat(
        &self,
        endpoint: &str,
        model: &str,
        messages: &[ChatMessage],
        stream: bool,
    ) -> Result<reqwest::Response, TransportError> {
        let url = format!("{}/api/chat", base_url(endpoint));
        let body = ChatBody {
            model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            stream,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(timeout) = self.chat_timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(connection_error)?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(response)
    }

    async fn post_pull(
        &self,
        endpoint: &str,
        model: &str,
        stream: bool,
    ) -> Result<reqwest::Response, TransportError> {
        let url = format!("{}/api/pull", base_url(endpoint));
        let response = self
            .client
            .post(&url)
            .json(&PullBody { model, stream })
            .send()
            .await
            .map_err(connection_error)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(response)
    }
}

#[async_trait]
impl LocalBackend for OllamaBackend {
    #[instrument(skip_all, fields(endpoint = %endpoint, model = %model))]
    async fn chat(
        &self,
        endpoint: &str,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String, TransportError> {
        let response = self.post_chat(endpoint, model, messages, false).await?;
        let reply: ChatReply = response.json().await.map_err(connection_error)?;

        if let Some(error) = reply.error {
            return Err(TransportError::Remote(error));
        }
        let content = reply.message.map(|m| m.content).unwrap_or_default();
        debug!(characters = content.len(), "chat reply received");
        Ok(content)
    }

    #[instrument(skip_all, fields(endpoint = %endpoint, model = %model))]
    async fn chat_stream(
        &self,
        endpoint: &str,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<Option<TextStream>, TransportError> {
        let response = self.post_chat(endpoint, model, messages, true).await?;

        let chunks = ndjson::json_lines::<ChatReply, _, _, _>(response.bytes_stream())
            .filter_map(|line| async move {
                match line {
                    Ok(ChatReply {
                        error: Some(error), ..
                    }) => Some(Err(TransportError::Remote(error))),
                    Ok(ChatReply { message, .. }) => message
                        .map(|m| m.content)
                        .filter(|content| !content.is_empty())
                        .map(Ok),
                    Err(err) => Some(Err(err)),
                }
            });

        Ok(Some(chunks.boxed()))
    }
}

#[async_trait]
impl ModelPuller for OllamaBackend {
    #[instrument(skip_all, fields(endpoint = %endpoint, model = %model))]
    async fn pull_stream(
        &self,
        endpoint: &str,
        model: &str,
    ) -> Result<Option<PullStream>, TransportError> {
        let response = self.post_pull(endpoint, model, true).await?;

        let payloads = ndjson::json_lines::<PullLine, _, _, _>(response.bytes_stream()).map(
            |line| match line? {
                PullLine {
                    error: Some(error), ..
                } => Err(TransportError::Remote(error)),
                PullLine { payload, .. } => Ok(payload),
            },
        );

        Ok(Some(payloads.boxed()))
    }

    #[instrument(skip_all, fields(endpoint = %endpoint, model = %model))]
    async fn pull(&self, endpoint: &str, model: &str) -> Result<serde_json::Value, TransportError> {
        let response = self.post_pull(endpoint, model, false).await?;
        let value: serde_json::Value = response.json().await.map_err(connection_error)?;

        match value.get("error").and_then(serde_json::Value::as_str) {
            Some(error) => Err(TransportError::Remote(error.to_string())),
            None => Ok(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn messages() -> Vec<ChatMessage> {
        vec![ChatMessage::user("build the domain")]
    }

    #[tokio::test]
    async fn chat_posts_messages_and_returns_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({
                "model": "deepseek-coder-v2",
                "stream": false,
                "messages": [{"role": "user", "content": "build the domain"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "{\"files\":[]}"},
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = OllamaBackend::new()
            .chat(&format!("{}/", server.uri()), "deepseek-coder-v2", &messages())
            .await
            .unwrap();

        assert_eq!(reply, "{\"files\":[]}");
    }

    #[tokio::test]
    async fn chat_stream_yields_content_chunks_in_order() {
        let server = MockServer::start().await;
        let body = concat!(
            "{\"message\":{\"content\":\"{\\\"fi\"},\"done\":false}\n",
            "{\"message\":{\"content\":\"les\\\":[]}\"},\"done\":false}\n",
            "{\"message\":{\"content\":\"\"},\"done\":true}\n",
        );
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let stream = OllamaBackend::new()
            .chat_stream(&server.uri(), "m", &messages())
            .await
            .unwrap()
            .unwrap();
        let chunks: Vec<String> = stream.map(|c| c.unwrap()).collect().await;

        assert_eq!(chunks, vec!["{\"fi", "les\":[]}"]);
    }

    #[tokio::test]
    async fn status_errors_carry_the_daemon_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "model 'm' not found"})),
            )
            .mount(&server)
            .await;

        let err = OllamaBackend::new()
            .chat(&server.uri(), "m", &messages())
            .await
            .unwrap_err();

        match err {
            TransportError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "model 'm' not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_daemon_is_a_connection_error() {
        let err = OllamaBackend::new()
            .chat("http://127.0.0.1:1", "m", &messages())
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Connection(_)));
    }

    #[tokio::test]
    async fn pull_stream_decodes_progress_payloads() {
        let server = MockServer::start().await;
        let body = concat!(
            "{\"status\":\"pulling manifest\"}\n",
            "{\"status\":\"downloading\",\"digest\":\"sha256:a\",\"total\":100,\"completed\":40}\n",
            "{\"status\":\"success\"}\n",
        );
        Mock::given(method("POST"))
            .and(path("/api/pull"))
            .and(body_partial_json(json!({"model": "llama3", "stream": true})))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let stream = OllamaBackend::new()
            .pull_stream(&server.uri(), "llama3")
            .await
            .unwrap()
            .unwrap();
        let payloads: Vec<PullPayload> = stream.map(|p| p.unwrap()).collect().await;

        assert_eq!(payloads.len(), 3);
        assert_eq!(payloads[1].digest.as_deref(), Some("sha256:a"));
        assert_eq!(payloads[1].completed, Some(40));
        assert_eq!(payloads[2].status, "success");
    }

    #[tokio::test]
    async fn pull_stream_surfaces_error_lines() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/pull"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "{\"status\":\"pulling manifest\"}\n{\"error\":\"pull model manifest: file does not exist\"}\n",
            ))
            .mount(&server)
            .await;

        let stream = OllamaBackend::new()
            .pull_stream(&server.uri(), "nope")
            .await
            .unwrap()
            .unwrap();
        let items: Vec<_> = stream.collect().await;

        assert!(items[0].is_ok());
        assert!(matches!(&items[1], Err(TransportError::Remote(msg)) if msg.contains("does not exist")));
    }

    #[tokio::test]
    async fn blocking_pull_returns_final_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/pull"))
            .and(body_partial_json(json!({"stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
            .mount(&server)
            .await;

        let value = OllamaBackend::new().pull(&server.uri(), "llama3").await.unwrap();
        assert_eq!(value, json!({"status": "success"}));
    }
}
