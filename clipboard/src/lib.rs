//! Clipboard text access for QR Bolt.
//!
//! The export layer only ever writes text (the rendered image's data URL), so the
//! interface is a single write operation behind a trait:
//! - [`ClipboardProvider`]: generic interface for clipboard writes
//! - [`SystemClipboard`]: production implementation using the `arboard` crate (native only)
//! - [`NoClipboard`]: a provider for environments with no clipboard at all
//!
//! # Platform Support
//!
//! - **Windows / macOS**: native pasteboard through `arboard`
//! - **Linux X11 / Wayland**: selections through `arboard` (`wayland-data-control`)
//! - **Web (WASM)**: not supported, always reports [`ClipboardError::Unavailable`]
//!
//! # Example
//!
//! ```rust,no_run
//! use qrbolt_clipboard::{ClipboardError, ClipboardProvider, SystemClipboard};
//!
//! match SystemClipboard.set_text("data:image/png;base64,...") {
//!     Ok(()) => println!("copied"),
//!     Err(ClipboardError::Unavailable(reason)) => eprintln!("no clipboard: {reason}"),
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! ```

/// Error types for clipboard operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClipboardError {
    /// No clipboard capability, or it could not be opened.
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
    /// The clipboard was reachable but rejected the write.
    #[error("Clipboard write failed: {0}")]
    WriteFailed(String),
}

/// Trait for clipboard access, enabling mock implementations for testing.
pub trait ClipboardProvider: Send + Sync {
    /// Replaces the clipboard contents with `text`.
    ///
    /// # Errors
    /// - [`ClipboardError::Unavailable`] when there is no clipboard to write to
    /// - [`ClipboardError::WriteFailed`] when the platform refused the write
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard implementation using the `arboard` crate.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[cfg(not(target_arch = "wasm32"))]
impl ClipboardProvider for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        use arboard::Clipboard;

        let mut clipboard =
            Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;

        match clipboard.set_text(text) {
            Ok(()) => {
                log::trace!(
                    target: "qrbolt_clipboard",
                    "clipboard_text_set len={}",
                    text.len(),
                );
                Ok(())
            }
            Err(arboard::Error::ClipboardNotSupported) => Err(ClipboardError::Unavailable(
                arboard::Error::ClipboardNotSupported.to_string(),
            )),
            Err(e) => Err(ClipboardError::WriteFailed(e.to_string())),
        }
    }
}

/// Stub implementation for WASM (clipboard not yet supported).
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[cfg(target_arch = "wasm32")]
impl ClipboardProvider for SystemClipboard {
    fn set_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable(
            "clipboard is not supported on this target".to_owned(),
        ))
    }
}

/// Provider for headless runs: every write reports [`ClipboardError::Unavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClipboard;

impl ClipboardProvider for NoClipboard {
    fn set_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable(
            "clipboard access is disabled".to_owned(),
        ))
    }
}
