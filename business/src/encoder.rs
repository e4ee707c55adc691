//! Encoder adapter: text + options in, PNG artifact out.
//!
//! Symbol construction (error correction, module placement) is delegated to the `qrcode`
//! crate. This module only sizes and colors the raster and encodes it as PNG.
//!
//! Sizing follows the usual web renderer convention: `width` is the total image width
//! including the quiet zone. When `width` cannot fit one pixel per module the renderer
//! falls back to [`FALLBACK_SCALE`] pixels per module instead.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use qrcode::types::QrError;
use qrcode::{Color, QrCode};

use crate::artifact::QrArtifact;
use crate::settings::{ErrorLevel, Settings};

/// Pixels per module used when the requested width is smaller than the symbol.
pub const FALLBACK_SCALE: f64 = 4.0;

/// An opaque `#rrggbb` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor([u8; 3]);

impl HexColor {
    pub const NEAR_BLACK: Self = Self([0x0b, 0x0b, 0x0b]);
    pub const WHITE: Self = Self([0xff, 0xff, 0xff]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn to_rgb(self) -> Rgb<u8> {
        Rgb(self.0)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}, expected #rrggbb")]
pub struct ParseHexColorError(String);

impl FromStr for HexColor {
    type Err = ParseHexColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseHexColorError(s.to_owned());
        let digits = s.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid());
        }
        let channel =
            |at: usize| u8::from_str_radix(&digits[at..at + 2], 16).map_err(|_e| invalid());
        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

/// Dark/light color pair for the symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub dark: HexColor,
    pub light: HexColor,
}

impl Palette {
    pub const STANDARD: Self = Self {
        dark: HexColor::NEAR_BLACK,
        light: HexColor::WHITE,
    };

    /// Black-on-white, or white-on-black when `inverted`.
    pub fn for_inversion(inverted: bool) -> Self {
        if inverted {
            Self {
                dark: Self::STANDARD.light,
                light: Self::STANDARD.dark,
            }
        } else {
            Self::STANDARD
        }
    }
}

/// Everything the encoder needs besides the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Requested total image width in pixels.
    pub width: u32,
    /// Quiet zone in modules.
    pub margin: u32,
    pub level: ErrorLevel,
    pub palette: Palette,
}

impl From<&Settings> for EncodeOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            width: settings.size,
            margin: settings.margin,
            level: settings.level,
            palette: Palette::for_inversion(settings.inverted),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The content does not fit a symbol at the requested level.
    #[error("content cannot be encoded: {0}")]
    Capacity(QrError),
    #[error("failed to encode PNG: {0}")]
    Png(#[from] image::ImageError),
    /// The encode did not run to completion (e.g. the worker panicked).
    #[error("encoder did not complete: {0}")]
    Interrupted(String),
}

impl From<QrError> for EncodeError {
    fn from(err: QrError) -> Self {
        Self::Capacity(err)
    }
}

/// Maps text and options to a rendered artifact.
///
/// Implementations may block for a noticeable time on dense input; callers run them off
/// the event thread.
pub trait QrEncoder: Send + Sync {
    /// # Errors
    /// Returns [`EncodeError::Capacity`] when the content cannot be represented.
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<QrArtifact, EncodeError>;
}

/// Production encoder built on the `qrcode` and `image` crates.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrCodeEncoder;

impl QrEncoder for QrCodeEncoder {
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<QrArtifact, EncodeError> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), options.level.into())?;
        let image = rasterize(&code, options);
        let (width, height) = image.dimensions();

        let mut cursor = Cursor::new(Vec::new());
        image.write_to(&mut cursor, ImageFormat::Png)?;

        log::trace!(
            target: "qrbolt_business::encoder",
            "encoded modules={} width={width} level={}",
            code.width(),
            options.level,
        );

        Ok(QrArtifact::from_png(cursor.into_inner(), width, height))
    }
}

/// Draws `code` with its quiet zone, scaled to `options.width`.
pub fn rasterize(code: &QrCode, options: &EncodeOptions) -> RgbImage {
    let modules = code.width();
    let colors = code.to_colors();
    let margin = options.margin as usize;
    let span = modules + margin * 2;

    // When the width fits the symbol the image is exactly `width` pixels wide.
    let (scale, side) = if options.width as usize >= span {
        (f64::from(options.width) / span as f64, options.width)
    } else {
        (FALLBACK_SCALE, (span as f64 * FALLBACK_SCALE) as u32)
    };
    let scaled_margin = margin as f64 * scale;
    let inner_end = f64::from(side) - scaled_margin;

    let dark = options.palette.dark.to_rgb();
    let light = options.palette.light.to_rgb();

    ImageBuffer::from_fn(side, side, |x, y| {
        let (fx, fy) = (f64::from(x), f64::from(y));
        let inside = fx >= scaled_margin && fy >= scaled_margin && fx < inner_end && fy < inner_end;
        if !inside {
            return light;
        }

        let col = (((fx - scaled_margin) / scale).floor() as usize).min(modules - 1);
        let row = (((fy - scaled_margin) / scale).floor() as usize).min(modules - 1);
        match colors[row * modules + col] {
            Color::Dark => dark,
            Color::Light => light,
        }
    })
}
