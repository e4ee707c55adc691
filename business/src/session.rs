//! `QrSession`: the single object presentation surfaces talk to.
//!
//! ## How to use
//! 1) Build once with an encoder and an [`ExportService`]. The initial settings are
//!    rendered immediately.
//! 2) Forward user edits through [`QrSession::update_setting`] and export intents through
//!    [`QrSession::request_download`] / [`QrSession::request_copy`].
//! 3) From the update loop call [`QrSession::sync`] (non-blocking), or
//!    [`QrSession::settle`] when the caller can wait for the render to finish.
//!
//! Every mutation happens through `&mut self`, so there is one writer; readers either
//! query snapshots or hold a `StateReader` from one of the `subscribe_*` methods.

use std::sync::Arc;

use qrbolt_states::{StateReader, Store};
use tokio::time::Instant;

use crate::artifact::QrArtifact;
use crate::copy_feedback::{CopyFeedback, CopyState};
use crate::encoder::{QrCodeEncoder, QrEncoder};
use crate::export::{DownloadReceipt, ExportError, ExportService};
use crate::render::{RenderPipeline, RenderResult};
use crate::settings::{SettingChange, Settings, SettingsStore};

#[derive(Debug)]
pub struct QrSession {
    settings: SettingsStore,
    pipeline: RenderPipeline,
    export: ExportService,
    copy_feedback: CopyFeedback,
    exporting: bool,
    busy: Store<bool>,
}

impl QrSession {
    /// Creates a session and schedules the first render. Requires a tokio runtime.
    pub fn new(initial: Settings, encoder: Arc<dyn QrEncoder>, export: ExportService) -> Self {
        let mut session = Self {
            settings: SettingsStore::new(initial),
            pipeline: RenderPipeline::new(encoder),
            export,
            copy_feedback: CopyFeedback::default(),
            exporting: false,
            busy: Store::new(false),
        };
        session.rerender();
        session
    }

    /// A session with default settings and the `qrcode`-backed encoder.
    pub fn with_defaults(export: ExportService) -> Self {
        Self::new(Settings::default(), Arc::new(QrCodeEncoder), export)
    }

    pub fn settings(&self) -> Arc<Settings> {
        self.settings.snapshot()
    }

    pub fn render_result(&self) -> Arc<RenderResult> {
        self.pipeline.result()
    }

    /// `true` while a render or an export is in progress.
    pub fn is_busy(&self) -> bool {
        *self.busy.get()
    }

    pub fn copy_state(&self) -> CopyState {
        self.copy_feedback.state()
    }

    /// When the copy feedback will next revert to idle.
    pub fn copy_revert_deadline(&self) -> Option<Instant> {
        self.copy_feedback.revert_at()
    }

    pub fn subscribe_settings(&mut self) -> StateReader<Settings> {
        self.settings.subscribe()
    }

    pub fn subscribe_render(&mut self) -> StateReader<RenderResult> {
        self.pipeline.subscribe()
    }

    pub fn subscribe_busy(&mut self) -> StateReader<bool> {
        self.busy.subscribe()
    }

    /// Applies one field edit, resets copy feedback and re-renders.
    pub fn update_setting(&mut self, change: SettingChange) -> Arc<Settings> {
        self.copy_feedback.reset();
        let snapshot = self.settings.update(change);
        self.rerender();
        snapshot
    }

    /// Applies finished renders and expires copy feedback. Never blocks.
    pub fn sync(&mut self) {
        if self.pipeline.sync() {
            self.publish_busy();
        }
        self.copy_feedback.poll(Instant::now());
    }

    /// Waits until no render is in flight, then syncs.
    pub async fn settle(&mut self) {
        self.pipeline.settle().await;
        self.publish_busy();
        self.copy_feedback.poll(Instant::now());
    }

    /// Downloads the current artifact framed for print.
    ///
    /// Returns `Ok(None)` when there is nothing ready to export.
    ///
    /// # Errors
    /// When the file cannot be saved. Framing problems are handled by falling back.
    pub async fn request_download(&mut self) -> Result<Option<DownloadReceipt>, ExportError> {
        let Some(artifact) = self.ready_artifact() else {
            log::debug!(target: "qrbolt_business::session", "download_ignored reason=not_ready");
            return Ok(None);
        };

        self.set_exporting(true);
        let export = self.export.clone();
        let outcome = tokio::task::spawn_blocking(move || export.download(&artifact))
            .await
            .map_err(|e| ExportError::Interrupted(e.to_string()));
        self.set_exporting(false);

        outcome?.map(Some)
    }

    /// Copies the current artifact's data URL and returns the resulting feedback state.
    pub async fn request_copy(&mut self) -> CopyState {
        let Some(artifact) = self.ready_artifact() else {
            log::debug!(target: "qrbolt_business::session", "copy_ignored reason=not_ready");
            return self.copy_feedback.state();
        };

        let export = self.export.clone();
        let copied = match tokio::task::spawn_blocking(move || export.copy(&artifact)).await {
            Ok(result) => result.is_ok(),
            Err(e) => {
                log::warn!(target: "qrbolt_business::session", "copy_task_lost error={e}");
                false
            }
        };

        let state = if copied {
            CopyState::Copied
        } else {
            CopyState::Error
        };
        self.copy_feedback.record(state, Instant::now());
        state
    }

    /// A pending render carries no artifact, so exports are no-ops until it finishes.
    fn ready_artifact(&self) -> Option<QrArtifact> {
        self.pipeline.result().artifact().cloned()
    }

    fn rerender(&mut self) {
        let snapshot = self.settings.snapshot();
        self.pipeline.schedule(&snapshot);
        self.publish_busy();
    }

    fn set_exporting(&mut self, exporting: bool) {
        self.exporting = exporting;
        self.publish_busy();
    }

    fn publish_busy(&mut self) {
        let busy = self.pipeline.is_busy() || self.exporting;
        if *self.busy.get() != busy {
            self.busy.replace(busy);
        }
    }
}
