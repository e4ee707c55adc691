//! QR Bolt core: settings in, QR image out, plus export.
//!
//! Data flow: a user edit replaces the [`Settings`] snapshot, the [`RenderPipeline`]
//! supersedes any in-flight encode and starts a new one, and the newest completed
//! [`RenderResult`] becomes visible. A ready artifact can then be downloaded framed or
//! copied as a data URL through the [`ExportService`].
//!
//! [`QrSession`] ties these together for presentation surfaces.

mod artifact;
mod copy_feedback;
mod encoder;
mod export;
mod render;
mod session;
mod settings;

#[cfg(test)]
mod test_utils;

pub use artifact::{PNG_DATA_URL_PREFIX, QrArtifact};
pub use copy_feedback::{COPY_FEEDBACK_RESET, CopyFeedback, CopyState};
pub use encoder::{
    EncodeError, EncodeOptions, FALLBACK_SCALE, HexColor, Palette, ParseHexColorError,
    QrCodeEncoder, QrEncoder, rasterize,
};
pub use export::{
    DirectoryDownloader, DownloadReceipt, Downloader, EXPORT_FILENAME, ExportError,
    ExportService, FRAME_PADDING, Framer, FramingError, PngFramer,
};
pub use render::{EMPTY_MESSAGE, FAILURE_MESSAGE, RenderPipeline, RenderResult};
pub use session::QrSession;
pub use settings::{
    ErrorLevel, MARGIN_RANGE, ParseErrorLevelError, SIZE_RANGE, SettingChange, Settings,
    SettingsStore, TEXT_MAX_CHARS, normalize_text,
};
