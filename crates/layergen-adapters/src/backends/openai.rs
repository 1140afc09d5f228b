//! OpenAI-compatible hosted backend: chat completions and legacy completions.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use layergen_core::application::ports::{
    CloudBackend, CloudChatRequest, CloudCompletionRequest, TransportError,
};

use super::{base_url, connection_error, status_error};

/// Base URL used when a request does not name one.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: Client,
    default_base_url: String,
    timeout: Option<Duration>,
}

impl Default for OpenAiBackend {
    fn default() -> Self {
        Self {
            client: Client::new(),
            default_base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
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
    temperature: f32,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct Choices<T> {
    #[serde(default = "Vec::new")]
    choices: Vec<T>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

impl OpenAiBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the base URL used for requests without an explicit endpoint.
    pub fn with_default_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.default_base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn url(&self, endpoint: Option<&str>, path: &str) -> String {
        let base = endpoint
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(&self.default_base_url);
        format!("{}/{path}", base_url(base))
    }

    async fn post<B, T>(&self, url: &str, secret: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(url).bearer_auth(secret).json(body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(connection_error)?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        response.json().await.map_err(connection_error)
    }
}

#[async_trait]
impl CloudBackend for OpenAiBackend {
    #[instrument(skip_all, fields(model = %request.model))]
    async fn chat_completion(&self, request: CloudChatRequest) -> Result<String, TransportError> {
        let url = self.url(request.endpoint.as_deref(), "chat/completions");
        let body = ChatBody {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: request.temperature,
        };

        let reply: Choices<ChatChoice> = self.post(&url, &request.secret, &body).await?;
        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::Decode("response contained no choices".into()))?;

        let content = choice.message.content.unwrap_or_default();
        debug!(characters = content.len(), "chat completion received");
        Ok(content)
    }

    #[instrument(skip_all, fields(model = %request.model))]
    async fn completion(&self, request: CloudCompletionRequest) -> Result<String, TransportError> {
        let url = self.url(request.endpoint.as_deref(), "completions");
        let body = CompletionBody {
            model: &request.model,
            prompt: &request.prompt,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let reply: Choices<CompletionChoice> = self.post(&url, &request.secret, &body).await?;
        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::Decode("response contained no choices".into()))?;

        debug!(characters = choice.text.len(), "completion received");
        Ok(choice.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layergen_core::application::ports::ChatMessage;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat_request(endpoint: Option<String>) -> CloudChatRequest {
        CloudChatRequest {
            endpoint,
            secret: "sk-test".into(),
            model: "gpt-4".into(),
            messages: vec![
                ChatMessage::system("You are a code generator."),
                ChatMessage::user("build it"),
            ],
            temperature: 0.2,
        }
    }

    #[tokio::test]
    async fn chat_completion_sends_bearer_and_reads_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4",
                "messages": [
                    {"role": "system", "content": "You are a code generator."},
                    {"role": "user", "content": "build it"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"files\":[]}"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = OpenAiBackend::new()
            .chat_completion(chat_request(Some(format!("{}/v1", server.uri()))))
            .await
            .unwrap();

        assert_eq!(reply, "{\"files\":[]}");
    }

    #[tokio::test]
    async fn default_base_url_is_used_without_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "ok"}}]
            })))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new().with_default_base_url(server.uri());
        assert_eq!(backend.chat_completion(chat_request(None)).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn completion_posts_prompt_and_reads_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .and(body_partial_json(json!({
                "model": "code-davinci-002",
                "prompt": "generate",
                "max_tokens": 4000
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"text": "{\"files\":[]}", "index": 0}]
            })))
            .mount(&server)
            .await;

        let reply = OpenAiBackend::new()
            .with_default_base_url(server.uri())
            .completion(CloudCompletionRequest {
                endpoint: None,
                secret: "sk".into(),
                model: "code-davinci-002".into(),
                prompt: "generate".into(),
                max_tokens: 4000,
                temperature: 0.2,
            })
            .await
            .unwrap();

        assert_eq!(reply, "{\"files\":[]}");
    }

    #[tokio::test]
    async fn api_errors_map_to_status_with_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = OpenAiBackend::new()
            .with_default_base_url(server.uri())
            .chat_completion(chat_request(None))
            .await
            .unwrap_err();

        match err {
            TransportError::Status { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_choices_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = OpenAiBackend::new()
            .with_default_base_url(server.uri())
            .chat_completion(chat_request(None))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Decode(_)));
    }
}
