//! Provider Dispatcher - routes a prompt to the right backend convention.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError,
        error::resolution_error,
        ports::{
            ChatMessage, CloudBackend, CloudChatRequest, CloudCompletionRequest, LocalBackend,
            ProgressSink, TransportError, output::notify,
        },
    },
    domain::{
        BackendTarget, CallStyle, ProgressEvent, ProviderConfig, ProviderKind,
        routing::{MAX_COMPLETION_TOKENS, SYSTEM_INSTRUCTION, TEMPERATURE},
    },
    error::LayergenResult,
};

/// Sends prompts to local or cloud backends. Never retries.
pub struct ProviderDispatcher {
    local: Arc<dyn LocalBackend>,
    cloud: Arc<dyn CloudBackend>,
}

impl ProviderDispatcher {
    pub fn new(local: Arc<dyn LocalBackend>, cloud: Arc<dyn CloudBackend>) -> Self {
        Self { local, cloud }
    }

    /// Send `prompt` to `provider` and return the raw response text.
    ///
    /// With a sink, local calls stream and report `Generation` progress.
    #[instrument(skip_all, fields(provider = %provider.name(), kind = %provider.kind()))]
    pub async fn dispatch(
        &self,
        provider: &ProviderConfig,
        prompt: &str,
        sink: Option<&dyn ProgressSink>,
    ) -> LayergenResult<String> {
        let target = BackendTarget::from_provider(provider).map_err(resolution_error)?;
        debug!(?target, prompt_len = prompt.len(), "Dispatching prompt");

        let text = match &target {
            BackendTarget::Local { endpoint, model } => {
                self.dispatch_local(endpoint, model, prompt, sink).await
            }
            BackendTarget::Cloud {
                model,
                secret,
                endpoint,
            } => {
                self.dispatch_cloud(model, secret, endpoint.as_deref(), prompt)
                    .await
            }
        }
        .map_err(|err| backend_error(&target, err))?;

        info!(response_len = text.len(), "Backend responded");
        Ok(text)
    }

    async fn dispatch_local(
        &self,
        endpoint: &str,
        model: &str,
        prompt: &str,
        sink: Option<&dyn ProgressSink>,
    ) -> Result<String, TransportError> {
        let messages = [ChatMessage::user(prompt)];

        if sink.is_some() {
            if let Some(mut stream) = self.local.chat_stream(endpoint, model, &messages).await? {
                let mut text = String::new();
                let mut chunks = 0;
                let mut characters = 0;
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk?;
                    chunks += 1;
                    characters += chunk.chars().count();
                    text.push_str(&chunk);
                    notify(sink, &ProgressEvent::Generation { chunks, characters });
                }
                return Ok(text);
            }
            debug!("Local backend cannot stream; falling back to a blocking chat");
        }

        self.local.chat(endpoint, model, &messages).await
    }

    async fn dispatch_cloud(
        &self,
        model: &str,
        secret: &str,
        endpoint: Option<&str>,
        prompt: &str,
    ) -> Result<String, TransportError> {
        match CallStyle::for_model(model) {
            CallStyle::Completion => {
                self.cloud
                    .completion(CloudCompletionRequest {
                        endpoint: endpoint.map(str::to_string),
                        secret: secret.to_string(),
                        model: model.to_string(),
                        prompt: prompt.to_string(),
                        max_tokens: MAX_COMPLETION_TOKENS,
                        temperature: TEMPERATURE,
                    })
                    .await
            }
            CallStyle::Chat => {
                self.cloud
                    .chat_completion(CloudChatRequest {
                        endpoint: endpoint.map(str::to_string),
                        secret: secret.to_string(),
                        model: model.to_string(),
                        messages: vec![
                            ChatMessage::system(SYSTEM_INSTRUCTION),
                            ChatMessage::user(prompt),
                        ],
                        temperature: TEMPERATURE,
                    })
                    .await
            }
        }
    }
}

fn backend_error(target: &BackendTarget, err: TransportError) -> ApplicationError {
    ApplicationError::Backend {
        kind: target.kind(),
        model: target.model().to_string(),
        endpoint: match target.kind() {
            ProviderKind::Local => target.endpoint().map(str::to_string),
            ProviderKind::Cloud => None,
        },
        reason: err.to_string(),
    }
}
