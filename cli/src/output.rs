//! Styled terminal output for the CLI.

use std::fmt::Display;

use console::{Term, style};
use qrbolt_business::{CopyState, DownloadReceipt, ExportError, QrSession, RenderResult};

/// Writes status lines to stdout.
pub struct Output {
    term: Term,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    /// Print a success message with a green checkmark.
    pub fn success(&self, message: impl Display) {
        drop(
            self.term
                .write_line(&format!("{} {}", style("✓").green().bold(), message)),
        );
    }

    /// Print an error message with a red X.
    pub fn error(&self, message: impl Display) {
        drop(
            self.term
                .write_line(&format!("{} {}", style("✗").red().bold(), message)),
        );
    }

    pub fn info(&self, message: impl Display) {
        drop(
            self.term
                .write_line(&format!("{} {}", style("ℹ").blue().bold(), message)),
        );
    }

    pub fn print(&self, message: impl Display) {
        drop(self.term.write_line(&message.to_string()));
    }

    pub fn dim(&self, message: impl Display) {
        drop(self.term.write_line(&style(message).dim().to_string()));
    }

    /// Print the render result, busy flag and copy label of a session.
    pub fn session_status(&self, session: &QrSession) {
        let result = session.render_result();
        match &*result {
            RenderResult::Ready(_) => self.success(render_summary(&result)),
            RenderResult::Failed(_) => self.error(render_summary(&result)),
            RenderResult::Empty | RenderResult::Pending => self.info(render_summary(&result)),
        }
        self.dim(format!(
            "busy: {}  copy: {}",
            session.is_busy(),
            session.copy_state().label()
        ));
    }

    /// Print the outcome of a download request. Returns `false` on failure.
    pub fn download(&self, outcome: &Result<Option<DownloadReceipt>, ExportError>) -> bool {
        match outcome {
            Ok(Some(receipt)) if receipt.framed => {
                self.success(format!("Saved {}", receipt.path.display()));
                true
            }
            Ok(Some(receipt)) => {
                self.success(format!("Saved {} (unframed)", receipt.path.display()));
                true
            }
            Ok(None) => {
                self.info("Nothing to download yet.");
                true
            }
            Err(e) => {
                self.error(format!("Download failed: {e}"));
                false
            }
        }
    }

    pub fn copy(&self, state: CopyState) {
        match state {
            CopyState::Copied => self.success("Copied PNG data URL to the clipboard"),
            CopyState::Error => self.error(state.label()),
            CopyState::Idle => self.info("Nothing to copy yet."),
        }
    }
}

/// One-line description of a render result.
pub fn render_summary(result: &RenderResult) -> String {
    match result {
        RenderResult::Ready(artifact) => {
            format!("QR code ready ({}x{})", artifact.width(), artifact.height())
        }
        RenderResult::Pending => "Rendering...".to_owned(),
        RenderResult::Empty | RenderResult::Failed(_) => {
            result.message().unwrap_or_default().to_owned()
        }
    }
}
