//! Render pipeline: settings snapshot in, exactly one [`RenderResult`] out.
//!
//! ## Ordering
//! Results are committed **last-settings-wins**, not last-completion-wins. Each call to
//! [`RenderPipeline::schedule`] issues a new generation from a [`TaskTracker`]; an encode
//! that finishes after a newer schedule is dropped when it is synced, without touching
//! the current result.
//!
//! ## Driving the pipeline
//! Encodes run on tokio's blocking pool inside a `JoinSet`. Completions are applied on the
//! caller's side only, from one of:
//! - [`RenderPipeline::sync`]: apply whatever has already finished (call once per frame)
//! - [`RenderPipeline::next_completion`]: wait for one encode
//! - [`RenderPipeline::settle`]: wait until nothing is in flight
//!
//! `schedule` must be called from within a tokio runtime.

use std::sync::Arc;

use qrbolt_states::{StateReader, Store, TaskId, TaskTracker};
use tokio::task::{JoinError, JoinSet};

use crate::artifact::QrArtifact;
use crate::encoder::{EncodeError, EncodeOptions, QrEncoder};
use crate::settings::Settings;

/// Shown when there is nothing to encode.
pub const EMPTY_MESSAGE: &str = "Enter text or a URL to generate a QR code.";
/// Shown when the encoder rejects the content.
pub const FAILURE_MESSAGE: &str = "We could not render that QR code. Try shorter content.";

/// The one authoritative render state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RenderResult {
    /// Text is empty or whitespace; nothing to render.
    #[default]
    Empty,
    /// An encode for the latest settings is in flight.
    Pending,
    Ready(QrArtifact),
    /// The latest encode failed; carries the user-facing message.
    Failed(String),
}

impl RenderResult {
    /// User-facing message for `Empty` and `Failed`.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Empty => Some(EMPTY_MESSAGE),
            Self::Failed(message) => Some(message),
            Self::Pending | Self::Ready(_) => None,
        }
    }

    pub fn artifact(&self) -> Option<&QrArtifact> {
        match self {
            Self::Ready(artifact) => Some(artifact),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

struct RenderOutcome {
    id: TaskId,
    result: Result<QrArtifact, EncodeError>,
}

/// Keeps [`RenderResult`] consistent with the latest settings snapshot.
pub struct RenderPipeline {
    encoder: Arc<dyn QrEncoder>,
    tracker: TaskTracker,
    tasks: JoinSet<RenderOutcome>,
    result: Store<RenderResult>,
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("tracker", &self.tracker)
            .field("in_flight", &self.tasks.len())
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

impl RenderPipeline {
    pub fn new(encoder: Arc<dyn QrEncoder>) -> Self {
        Self {
            encoder,
            tracker: TaskTracker::for_type::<Self>(),
            tasks: JoinSet::new(),
            result: Store::default(),
        }
    }

    pub fn result(&self) -> Arc<RenderResult> {
        self.result.get()
    }

    pub fn subscribe(&mut self) -> StateReader<RenderResult> {
        self.result.subscribe()
    }

    /// `true` while the latest encode has not completed.
    pub fn is_busy(&self) -> bool {
        self.result.get().is_pending()
    }

    /// Encodes still running, stale ones included.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Reacts to a new settings snapshot, superseding any earlier encode.
    pub fn schedule(&mut self, settings: &Settings) {
        if !settings.has_content() {
            self.tracker.invalidate();
            log::debug!(
                target: "qrbolt_business::render",
                "render_skipped reason=empty generation={}",
                self.tracker.generation(),
            );
            self.result.replace(RenderResult::Empty);
            return;
        }

        let handle = self.tracker.issue();
        let id = handle.id();
        let token = handle.cancellation_token();
        let encoder = Arc::clone(&self.encoder);
        let text = settings.text.clone();
        let options = EncodeOptions::from(settings);

        log::debug!(
            target: "qrbolt_business::render",
            "render_scheduled generation={} width={} margin={} level={}",
            id.generation(),
            options.width,
            options.margin,
            options.level,
        );
        self.result.replace(RenderResult::Pending);

        self.tasks.spawn(async move {
            // Superseded before we got scheduled: skip the work, the result is dropped anyway.
            if token.is_cancelled() {
                return RenderOutcome {
                    id,
                    result: Err(EncodeError::Interrupted("superseded".to_owned())),
                };
            }
            let result = tokio::task::spawn_blocking(move || encoder.encode(&text, &options))
                .await
                .unwrap_or_else(|e| Err(EncodeError::Interrupted(e.to_string())));
            RenderOutcome { id, result }
        });
    }

    /// Applies every encode that has already finished. Returns `true` if the result changed.
    pub fn sync(&mut self) -> bool {
        let mut changed = false;
        while let Some(joined) = self.tasks.try_join_next() {
            changed |= self.commit(joined);
        }
        changed
    }

    /// Waits for one encode to finish and applies it.
    ///
    /// Returns `None` when nothing is in flight, otherwise whether the result changed.
    pub async fn next_completion(&mut self) -> Option<bool> {
        let joined = self.tasks.join_next().await?;
        Some(self.commit(joined))
    }

    /// Waits for every in-flight encode, stale ones included.
    pub async fn settle(&mut self) {
        while self.next_completion().await.is_some() {}
    }

    fn commit(&mut self, joined: Result<RenderOutcome, JoinError>) -> bool {
        let RenderOutcome { id, result } = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                // The wrapper task never panics on its own; this is runtime shutdown.
                log::warn!(target: "qrbolt_business::render", "render_task_lost error={e}");
                return false;
            }
        };

        if !self.tracker.complete(id) {
            log::debug!(
                target: "qrbolt_business::render",
                "render_discarded generation={} current={}",
                id.generation(),
                self.tracker.generation(),
            );
            return false;
        }

        let next = match result {
            Ok(artifact) => {
                log::debug!(
                    target: "qrbolt_business::render",
                    "render_ready generation={} width={}",
                    id.generation(),
                    artifact.width(),
                );
                RenderResult::Ready(artifact)
            }
            Err(e) => {
                log::warn!(
                    target: "qrbolt_business::render",
                    "render_failed generation={} error={e}",
                    id.generation(),
                );
                RenderResult::Failed(FAILURE_MESSAGE.to_owned())
            }
        };
        self.result.replace(next);
        true
    }
}
