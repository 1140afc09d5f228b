//! Model Provisioning - makes sure a local backend has the model.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::time::{Instant, timeout};
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{ModelPuller, ProgressSink, TransportError, output::notify},
    },
    domain::{PullAggregator, PullPayload},
    error::{LayergenError, LayergenResult},
};

/// Wall-clock budget for a whole model pull.
pub const DEFAULT_PULL_TIMEOUT: Duration = Duration::from_secs(600);

pub struct ProvisioningService {
    puller: Arc<dyn ModelPuller>,
    timeout: Duration,
}

impl ProvisioningService {
    pub fn new(puller: Arc<dyn ModelPuller>) -> Self {
        Self {
            puller,
            timeout: DEFAULT_PULL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Pull `model` into the backend at `endpoint`.
    ///
    /// Streams progress when the backend supports it, otherwise runs a
    /// blocking pull on a spawned task. Either way the whole operation is
    /// bounded by the configured timeout. Returns the final backend response
    /// as pretty-printed JSON.
    #[instrument(skip(self, sink), fields(timeout_secs = self.timeout.as_secs()))]
    pub async fn ensure_model(
        &self,
        model: &str,
        endpoint: &str,
        sink: Option<&dyn ProgressSink>,
    ) -> LayergenResult<String> {
        let started = Instant::now();
        info!("Pulling model");

        let streamed = timeout(self.timeout, self.pull_streaming(model, endpoint, sink))
            .await
            .map_err(|_| self.timed_out(model, endpoint))?
            .map_err(|err| provision_error(model, endpoint, err))?;

        let response = match streamed {
            Some(payload) => serde_json::to_value(payload).map_err(internal)?,
            None => {
                debug!("Backend cannot stream pulls; falling back to a blocking pull");
                let remaining = self.timeout.saturating_sub(started.elapsed());
                self.pull_blocking(model, endpoint, remaining).await?
            }
        };

        info!(elapsed_ms = started.elapsed().as_millis() as u64, "Model ready");
        serde_json::to_string_pretty(&response).map_err(internal)
    }

    /// `Ok(None)` when the backend cannot stream.
    async fn pull_streaming(
        &self,
        model: &str,
        endpoint: &str,
        sink: Option<&dyn ProgressSink>,
    ) -> Result<Option<PullPayload>, TransportError> {
        let Some(mut stream) = self.puller.pull_stream(endpoint, model).await? else {
            return Ok(None);
        };

        let mut aggregator = PullAggregator::new();
        let mut last = None;
        while let Some(payload) = stream.next().await {
            let payload = payload?;
            notify(sink, &aggregator.observe(&payload));
            last = Some(payload);
        }

        Ok(Some(last.unwrap_or_default()))
    }

    async fn pull_blocking(
        &self,
        model: &str,
        endpoint: &str,
        remaining: Duration,
    ) -> LayergenResult<serde_json::Value> {
        let puller = Arc::clone(&self.puller);
        let (task_model, task_endpoint) = (model.to_string(), endpoint.to_string());
        let handle = tokio::spawn(async move { puller.pull(&task_endpoint, &task_model).await });

        // Dropping the handle on timeout detaches the task; it is not aborted.
        match timeout(remaining, handle).await {
            Err(_) => {
                warn!("Blocking pull still running after the deadline; abandoning it");
                Err(self.timed_out(model, endpoint))
            }
            Ok(Err(join_err)) => Err(ApplicationError::Provision {
                model: model.to_string(),
                endpoint: endpoint.to_string(),
                reason: join_err.to_string(),
            }
            .into()),
            Ok(Ok(result)) => result.map_err(|err| provision_error(model, endpoint, err)),
        }
    }

    fn timed_out(&self, model: &str, endpoint: &str) -> LayergenError {
        ApplicationError::ProvisionTimeout {
            model: model.to_string(),
            endpoint: endpoint.to_string(),
            seconds: self.timeout.as_secs(),
        }
        .into()
    }
}

fn provision_error(model: &str, endpoint: &str, err: TransportError) -> LayergenError {
    ApplicationError::Provision {
        model: model.to_string(),
        endpoint: endpoint.to_string(),
        reason: err.to_string(),
    }
    .into()
}

fn internal(err: serde_json::Error) -> LayergenError {
    LayergenError::Internal {
        message: format!("could not serialize pull response: {err}"),
    }
}
