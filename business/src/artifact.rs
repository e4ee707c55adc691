use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// A fully rendered QR image produced by one successful encode.
///
/// Holds the PNG bytes and the equivalent `data:` URL. Both are reference counted, so
/// cloning an artifact (into a render result, an export task, a reader) is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrArtifact {
    png: Arc<[u8]>,
    data_url: Arc<str>,
    width: u32,
    height: u32,
}

impl QrArtifact {
    pub fn from_png(png: Vec<u8>, width: u32, height: u32) -> Self {
        let data_url = format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(&png));
        Self {
            png: png.into(),
            data_url: data_url.into(),
            width,
            height,
        }
    }

    /// Encoded PNG bytes.
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    /// The image as a directly displayable `data:image/png;base64,...` string.
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
