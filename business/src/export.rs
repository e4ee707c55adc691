//! Export of a ready artifact: framed PNG download and data URL copy.
//!
//! Both operations are stateless apart from their input artifact. Framing is cosmetic
//! padding for print and is independent of the quiet zone baked into the symbol; when
//! the drawing surface fails the unframed artifact is saved instead.

use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use image::{ImageFormat, Rgb, RgbImage, imageops};
use qrbolt_clipboard::{ClipboardError, ClipboardProvider};

use crate::artifact::QrArtifact;

/// Filename used for every download.
pub const EXPORT_FILENAME: &str = "qr-bolt.png";
/// White padding added on each side of a downloaded image, in pixels.
pub const FRAME_PADDING: u32 = 24;

#[derive(Debug, thiserror::Error)]
pub enum FramingError {
    #[error("drawing surface unavailable: {0}")]
    Unavailable(String),
    #[error("framing failed: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to save {filename}: {source}")]
    Save {
        filename: String,
        #[source]
        source: std::io::Error,
    },
    #[error("export task did not complete: {0}")]
    Interrupted(String),
}

/// Drawing surface: produces a padded copy of an artifact as PNG bytes.
pub trait Framer: Send + Sync {
    /// # Errors
    /// Any failure to decode, draw or encode.
    fn frame(&self, artifact: &QrArtifact, padding: u32) -> Result<Vec<u8>, FramingError>;
}

/// Framer built on the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngFramer;

impl Framer for PngFramer {
    fn frame(&self, artifact: &QrArtifact, padding: u32) -> Result<Vec<u8>, FramingError> {
        let source =
            image::load_from_memory_with_format(artifact.png(), ImageFormat::Png)?.to_rgb8();
        let (width, height) = source.dimensions();

        let mut canvas = RgbImage::from_pixel(
            width + padding * 2,
            height + padding * 2,
            Rgb([0xff, 0xff, 0xff]),
        );
        imageops::overlay(&mut canvas, &source, i64::from(padding), i64::from(padding));

        let mut cursor = Cursor::new(Vec::new());
        canvas.write_to(&mut cursor, ImageFormat::Png)?;
        Ok(cursor.into_inner())
    }
}

/// File-save primitive.
pub trait Downloader: Send + Sync {
    /// Stores `bytes` under `filename`, returning where they went.
    ///
    /// # Errors
    /// I/O failures from the underlying storage.
    fn save(&self, bytes: &[u8], filename: &str) -> std::io::Result<PathBuf>;
}

/// Saves downloads into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectoryDownloader {
    dir: PathBuf,
}

impl DirectoryDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

impl Downloader for DirectoryDownloader {
    fn save(&self, bytes: &[u8], filename: &str) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// Where a download landed and whether the frame made it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReceipt {
    pub path: PathBuf,
    pub framed: bool,
}

/// Export operations over a ready artifact.
#[derive(Clone)]
pub struct ExportService {
    framer: Arc<dyn Framer>,
    downloader: Arc<dyn Downloader>,
    clipboard: Arc<dyn ClipboardProvider>,
}

impl std::fmt::Debug for ExportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportService").finish_non_exhaustive()
    }
}

impl ExportService {
    pub fn new(
        framer: Arc<dyn Framer>,
        downloader: Arc<dyn Downloader>,
        clipboard: Arc<dyn ClipboardProvider>,
    ) -> Self {
        Self {
            framer,
            downloader,
            clipboard,
        }
    }

    /// Saves the artifact framed with [`FRAME_PADDING`], or unframed if framing fails.
    ///
    /// # Errors
    /// Only when the downloader cannot store the bytes.
    pub fn download(&self, artifact: &QrArtifact) -> Result<DownloadReceipt, ExportError> {
        let (bytes, framed) = match self.framer.frame(artifact, FRAME_PADDING) {
            Ok(png) => (png, true),
            Err(e) => {
                log::warn!(
                    target: "qrbolt_business::export",
                    "framing_failed falling_back=unframed error={e}",
                );
                (artifact.png().to_vec(), false)
            }
        };

        let path = self
            .downloader
            .save(&bytes, EXPORT_FILENAME)
            .map_err(|source| ExportError::Save {
                filename: EXPORT_FILENAME.to_owned(),
                source,
            })?;

        log::info!(
            target: "qrbolt_business::export",
            "download_saved path={} framed={framed} bytes={}",
            path.display(),
            bytes.len(),
        );
        Ok(DownloadReceipt { path, framed })
    }

    /// Copies the artifact's data URL to the clipboard.
    ///
    /// # Errors
    /// [`ClipboardError::Unavailable`] or [`ClipboardError::WriteFailed`] from the provider.
    pub fn copy(&self, artifact: &QrArtifact) -> Result<(), ClipboardError> {
        self.clipboard.set_text(artifact.data_url()).inspect_err(|e| {
            log::warn!(target: "qrbolt_business::export", "copy_failed error={e}");
        })
    }
}
