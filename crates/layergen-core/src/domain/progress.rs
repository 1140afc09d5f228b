//! Progress reporting for long-running backend calls.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A progress update handed to a progress sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Model download, aggregated across every layer digest seen so far.
    Pull {
        total: u64,
        /// Never exceeds `total`.
        completed: u64,
        status: Option<String>,
    },
    /// Streamed response text received so far.
    Generation { chunks: usize, characters: usize },
}

impl ProgressEvent {
    /// Completion ratio in `0.0..=1.0`, when the total is known.
    pub fn fraction(&self) -> Option<f64> {
        match self {
            Self::Pull {
                total, completed, ..
            } if *total > 0 => Some(*completed as f64 / *total as f64),
            _ => None,
        }
    }
}

/// One line of a local backend's pull stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullPayload {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<u64>,
}

/// Folds per-layer pull payloads into one overall progress figure.
///
/// A model download reports each layer under its own digest; the overall
/// total is the sum of the latest total seen for every digest.
#[derive(Debug, Default)]
pub struct PullAggregator {
    totals: HashMap<String, u64>,
    completed: HashMap<String, u64>,
    status: Option<String>,
}

impl PullAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, payload: &PullPayload) -> ProgressEvent {
        if let Some(digest) = payload.digest.as_deref().filter(|d| !d.is_empty()) {
            if let Some(total) = payload.total {
                self.totals.insert(digest.to_string(), total);
            }
            if let Some(completed) = payload.completed {
                self.completed.insert(digest.to_string(), completed);
            }
        }
        if !payload.status.is_empty() {
            self.status = Some(payload.status.clone());
        }

        self.current()
    }

    pub fn current(&self) -> ProgressEvent {
        let total: u64 = self.totals.values().sum();
        let completed: u64 = self.completed.values().sum();

        ProgressEvent::Pull {
            total,
            completed: completed.min(total),
            status: self.status.clone(),
        }
    }
}
