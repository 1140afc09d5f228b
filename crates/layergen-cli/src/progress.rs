//! Terminal progress for model pulls and streamed generations.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use layergen_core::application::ports::{ProgressSink, SinkError};
use layergen_core::domain::ProgressEvent;

const PULL_TEMPLATE: &str =
    "{spinner:.green} {msg:<24} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({eta})";
const GENERATION_TEMPLATE: &str = "{spinner:.green} {msg} [{elapsed}]";

/// Draws a byte-progress bar while a model is downloaded.
pub struct PullProgress {
    bar: ProgressBar,
}

impl PullProgress {
    pub fn new(label: &str, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr())
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template(PULL_TEMPLATE) {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_message(label.to_string());
        if visible {
            bar.enable_steady_tick(Duration::from_millis(120));
        }
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for PullProgress {
    fn on_progress(&self, event: &ProgressEvent) -> Result<(), SinkError> {
        if let ProgressEvent::Pull {
            total,
            completed,
            status,
        } = event
        {
            if *total > 0 {
                self.bar.set_length(*total);
                self.bar.set_position(*completed);
            }
            if let Some(status) = status {
                self.bar.set_message(status.clone());
            }
        }
        Ok(())
    }
}

/// Spinner counting streamed response text.
pub struct GenerationProgress {
    bar: ProgressBar,
}

impl GenerationProgress {
    pub fn new(label: &str, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template(GENERATION_TEMPLATE) {
            bar.set_style(style);
        }
        bar.set_message(label.to_string());
        if visible {
            bar.enable_steady_tick(Duration::from_millis(120));
        }
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for GenerationProgress {
    fn on_progress(&self, event: &ProgressEvent) -> Result<(), SinkError> {
        if let ProgressEvent::Generation { chunks, characters } = event {
            self.bar
                .set_message(format!("receiving response: {characters} chars in {chunks} chunks"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pull_progress_tracks_totals() {
        let progress = PullProgress::new("pulling llama3", false);
        progress
            .on_progress(&ProgressEvent::Pull {
                total: 200,
                completed: 50,
                status: Some("downloading".into()),
            })
            .unwrap();

        assert_eq!(progress.bar.length(), Some(200));
        assert_eq!(progress.bar.position(), 50);
        assert_eq!(progress.bar.message(), "downloading");
        progress.finish();
    }

    #[test]
    fn pull_progress_ignores_unknown_totals() {
        let progress = PullProgress::new("pulling llama3", false);
        progress
            .on_progress(&ProgressEvent::Pull {
                total: 0,
                completed: 0,
                status: None,
            })
            .unwrap();

        assert_eq!(progress.bar.position(), 0);
        assert_eq!(progress.bar.message(), "pulling llama3");
    }

    #[test]
    fn generation_progress_reports_characters() {
        let progress = GenerationProgress::new("generating", false);
        progress
            .on_progress(&ProgressEvent::Generation {
                chunks: 3,
                characters: 42,
            })
            .unwrap();

        assert!(progress.bar.message().contains("42 chars"));
        progress.finish();
    }
}
