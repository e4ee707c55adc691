//! Test doubles for the encoder, framing, download and clipboard seams.
//!
//! ```ignore
//! let encoder = Arc::new(GatedEncoder::default());
//! let release = encoder.gate("hello");
//! pipeline.schedule(&settings);
//! release.send(()).unwrap(); // the encode for "hello" may now finish
//! ```

#![cfg(test)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use qrbolt_clipboard::{ClipboardError, ClipboardProvider};
use qrcode::types::QrError;

use crate::artifact::QrArtifact;
use crate::encoder::{EncodeError, EncodeOptions, QrCodeEncoder, QrEncoder};
use crate::export::{Downloader, Framer, FramingError};

/// Real encoder that remembers every call.
#[derive(Default)]
pub struct RecordingEncoder {
    calls: Mutex<Vec<(String, EncodeOptions)>>,
}

impl RecordingEncoder {
    pub fn calls(&self) -> Vec<(String, EncodeOptions)> {
        self.calls.lock().expect("lock should not be poisoned").clone()
    }
}

impl QrEncoder for RecordingEncoder {
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<QrArtifact, EncodeError> {
        self.calls
            .lock()
            .expect("lock should not be poisoned")
            .push((text.to_owned(), options.clone()));
        QrCodeEncoder.encode(text, options)
    }
}

/// Always reports that the content does not fit.
pub struct FailingEncoder;

impl QrEncoder for FailingEncoder {
    fn encode(&self, _text: &str, _options: &EncodeOptions) -> Result<QrArtifact, EncodeError> {
        Err(EncodeError::Capacity(QrError::DataTooLong))
    }
}

/// Real encoder that rejects text longer than the given number of bytes.
pub struct LimitedEncoder(pub usize);

impl QrEncoder for LimitedEncoder {
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<QrArtifact, EncodeError> {
        if text.len() > self.0 {
            return Err(EncodeError::Capacity(QrError::DataTooLong));
        }
        QrCodeEncoder.encode(text, options)
    }
}

/// Blocks each encode until the test releases the gate for that text.
///
/// The artifact's "PNG" bytes are the text itself, which makes it easy to tell results
/// apart. Dropping the sender releases the encode too.
#[derive(Default)]
pub struct GatedEncoder {
    gates: Mutex<HashMap<String, flume::Receiver<()>>>,
}

impl GatedEncoder {
    pub fn gate(&self, text: &str) -> flume::Sender<()> {
        let (send, recv) = flume::unbounded();
        self.gates
            .lock()
            .expect("lock should not be poisoned")
            .insert(text.to_owned(), recv);
        send
    }
}

impl QrEncoder for GatedEncoder {
    fn encode(&self, text: &str, _options: &EncodeOptions) -> Result<QrArtifact, EncodeError> {
        let gate = self
            .gates
            .lock()
            .expect("lock should not be poisoned")
            .get(text)
            .cloned();
        if let Some(gate) = gate {
            let _released = gate.recv();
        }
        Ok(QrArtifact::from_png(text.as_bytes().to_vec(), 1, 1))
    }
}

/// A drawing surface that is never available.
pub struct FailingFramer;

impl Framer for FailingFramer {
    fn frame(&self, _artifact: &QrArtifact, _padding: u32) -> Result<Vec<u8>, FramingError> {
        Err(FramingError::Unavailable("no drawing surface in tests".to_owned()))
    }
}

/// Keeps saved files in memory.
#[derive(Default)]
pub struct MemoryDownloader {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemoryDownloader {
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().expect("lock should not be poisoned").clone()
    }
}

impl Downloader for MemoryDownloader {
    fn save(&self, bytes: &[u8], filename: &str) -> std::io::Result<PathBuf> {
        self.saved
            .lock()
            .expect("lock should not be poisoned")
            .push((filename.to_owned(), bytes.to_vec()));
        Ok(Path::new("memory").join(filename))
    }
}

/// Clipboard that records writes, or rejects them with a fixed error.
#[derive(Default)]
pub struct MockClipboard {
    contents: Mutex<Vec<String>>,
    reject_with: Option<ClipboardError>,
}

impl MockClipboard {
    pub fn rejecting(error: ClipboardError) -> Self {
        Self {
            contents: Mutex::default(),
            reject_with: Some(error),
        }
    }

    pub fn writes(&self) -> Vec<String> {
        self.contents.lock().expect("lock should not be poisoned").clone()
    }
}

impl ClipboardProvider for MockClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        if let Some(error) = &self.reject_with {
            return Err(error.clone());
        }
        self.contents
            .lock()
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))?
            .push(text.to_owned());
        Ok(())
    }
}

