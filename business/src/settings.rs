//! QR settings and the store that owns them.
//!
//! ## Normalization
//! Every edit goes through [`SettingChange`] so field rules apply before a value becomes
//! part of a snapshot:
//! - text is limited to [`TEXT_MAX_CHARS`] and loses one leading `http://` / `https://`
//!   (case-insensitive, leading whitespace included)
//! - size and margin are clamped to [`SIZE_RANGE`] and [`MARGIN_RANGE`]
//!
//! The protocol strip runs on every text edit, so retyping `https://` in front of already
//! stored text strips it again.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::Arc;

use qrbolt_states::{StateReader, Store};
use serde::{Deserialize, Serialize};

/// Maximum accepted text length, in characters.
pub const TEXT_MAX_CHARS: usize = 240;
/// Output width in pixels.
pub const SIZE_RANGE: RangeInclusive<u32> = 180..=520;
/// Quiet zone width in modules.
pub const MARGIN_RANGE: RangeInclusive<u32> = 0..=10;

const DEFAULT_TEXT: &str = "https://";
const DEFAULT_SIZE: u32 = 320;
const DEFAULT_MARGIN: u32 = 2;

/// Error-correction level, ordered by increasing redundancy.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ErrorLevel {
    L,
    #[default]
    M,
    Q,
    H,
}

impl ErrorLevel {
    pub const ALL: [Self; 4] = [Self::L, Self::M, Self::Q, Self::H];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        }
    }

    /// Short guidance shown next to the level picker.
    pub fn helper(self) -> &'static str {
        match self {
            Self::L => "Best for long text",
            Self::M => "Balanced default",
            Self::Q => "Handles more damage",
            Self::H => "For tiny, dense codes",
        }
    }
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of `L`, `M`, `Q`, `H`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error correction level {0:?}, expected one of L, M, Q, H")]
pub struct ParseErrorLevelError(String);

impl FromStr for ErrorLevel {
    type Err = ParseErrorLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(Self::L),
            "M" => Ok(Self::M),
            "Q" => Ok(Self::Q),
            "H" => Ok(Self::H),
            _ => Err(ParseErrorLevelError(s.to_owned())),
        }
    }
}

impl From<ErrorLevel> for qrcode::EcLevel {
    fn from(level: ErrorLevel) -> Self {
        match level {
            ErrorLevel::L => Self::L,
            ErrorLevel::M => Self::M,
            ErrorLevel::Q => Self::Q,
            ErrorLevel::H => Self::H,
        }
    }
}

/// One immutable settings snapshot.
///
/// Fields are public for reading; build new snapshots through [`SettingsStore::update`]
/// or [`Settings::apply`] so bounds hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub text: String,
    pub size: u32,
    pub margin: u32,
    pub level: ErrorLevel,
    pub inverted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            text: normalize_text(DEFAULT_TEXT),
            size: DEFAULT_SIZE,
            margin: DEFAULT_MARGIN,
            level: ErrorLevel::default(),
            inverted: false,
        }
    }
}

impl Settings {
    /// `false` for empty or whitespace-only text, which renders nothing.
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Returns a copy with `change` applied and normalized.
    #[must_use]
    pub fn apply(&self, change: SettingChange) -> Self {
        let mut next = self.clone();
        match change {
            SettingChange::Text(raw) => next.text = normalize_text(&raw),
            SettingChange::Size(raw) => next.size = clamp_to(raw, &SIZE_RANGE),
            SettingChange::Margin(raw) => next.margin = clamp_to(raw, &MARGIN_RANGE),
            SettingChange::Level(level) => next.level = level,
            SettingChange::Inverted(inverted) => next.inverted = inverted,
        }
        next
    }
}

/// A whole-field replacement requested by a presentation surface.
///
/// Numeric values are signed and unbounded; clamping happens on apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingChange {
    Text(String),
    Size(i64),
    Margin(i64),
    Level(ErrorLevel),
    Inverted(bool),
}

impl SettingChange {
    /// Field name, for logs.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Size(_) => "size",
            Self::Margin(_) => "margin",
            Self::Level(_) => "level",
            Self::Inverted(_) => "inverted",
        }
    }
}

/// Limits `raw` to [`TEXT_MAX_CHARS`] and removes one leading protocol prefix.
pub fn normalize_text(raw: &str) -> String {
    let limited = match raw.char_indices().nth(TEXT_MAX_CHARS) {
        Some((end, _)) => &raw[..end],
        None => raw,
    };
    strip_protocol(limited).to_owned()
}

fn strip_protocol(text: &str) -> &str {
    let trimmed = text.trim_start();
    for scheme in ["https://", "http://"] {
        if let Some(head) = trimmed.get(..scheme.len())
            && head.eq_ignore_ascii_case(scheme)
        {
            return &trimmed[scheme.len()..];
        }
    }
    text
}

fn clamp_to(raw: i64, range: &RangeInclusive<u32>) -> u32 {
    let clamped = raw.clamp(i64::from(*range.start()), i64::from(*range.end()));
    // In range by construction.
    u32::try_from(clamped).unwrap_or(*range.start())
}

/// Owner of the current [`Settings`] snapshot.
#[derive(Debug, Default)]
pub struct SettingsStore {
    store: Store<Settings>,
}

impl SettingsStore {
    pub fn new(initial: Settings) -> Self {
        Self {
            store: Store::new(initial),
        }
    }

    /// Applies `change` and replaces the snapshot.
    pub fn update(&mut self, change: SettingChange) -> Arc<Settings> {
        let field = change.field();
        let next = self.store.get().apply(change);
        let snapshot = self.store.replace(next);
        log::debug!(
            target: "qrbolt_business::settings",
            "setting_updated field={field} version={}",
            self.store.version(),
        );
        snapshot
    }

    pub fn snapshot(&self) -> Arc<Settings> {
        self.store.get()
    }

    pub fn version(&self) -> u64 {
        self.store.version()
    }

    pub fn subscribe(&mut self) -> StateReader<Settings> {
        self.store.subscribe()
    }
}
