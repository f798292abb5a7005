//! Art Prompt card generator
//!
//! Edit a handful of text fields, pick a theme and an aspect ratio, and get a
//! styled card that can be exported as a PNG.
//!
//! # Architecture
//!
//! - [`state::FormStore`] owns the [`state::FormState`] and notifies
//!   subscribers after every edit
//! - [`rendering::Preview`] re-renders the card on every notification and
//!   publishes the new [`rendering::RenderedRoot`] through a [`RootHandle`]
//! - [`export::Exporter`] snapshots whatever root the handle holds, rasterizes
//!   it asynchronously and hands the PNG to a [`export::Downloader`]
//!
//! # Example
//!
//! ```no_run
//! use art_prompt::export::{Exporter, FileDownloader, PixmapRasterizer};
//! use art_prompt::rendering::Preview;
//! use art_prompt::state::{FieldEdit, FormStore};
//! use art_prompt::GeneratorConfig;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = GeneratorConfig::default();
//! let mut store = FormStore::default();
//! let preview = Preview::new(&config);
//! preview.mount(&mut store);
//!
//! store.apply(FieldEdit::Number("42".into()));
//! store.apply(FieldEdit::Title("LOOK UP\\nTODAY".into()));
//!
//! let exporter = Exporter::new(
//!     preview.handle(),
//!     PixmapRasterizer::new(),
//!     FileDownloader::new("."),
//!     &config,
//! );
//! let outcome = exporter.trigger().wait().await;
//! println!("{:?}", outcome);
//! # }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod export;
pub mod rendering;
pub mod state;
pub mod theme;

pub use rendering::RootHandle;
pub use state::HashtagPolicy;

/// Default name of the exported image. Not derived from form fields.
pub const DEFAULT_EXPORT_FILENAME: &str = "art-prompt.png";

/// Card width used on narrow displays
pub const CARD_WIDTH: u32 = 480;
/// Card width used on wide displays
pub const CARD_WIDTH_WIDE: u32 = 600;

/// Configuration for the generator
///
/// Defaults mirror the sample card: a 480px wide card exported as
/// `art-prompt.png` with hashtags of the form `onephotoaday007`.
///
/// # Examples
///
/// ```
/// let cfg = art_prompt::GeneratorConfig::default();
/// assert_eq!(cfg.export_filename, "art-prompt.png");
/// assert!(cfg.cache_bust);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// File name handed to the downloader
    pub export_filename: String,
    /// Card width in CSS pixels
    pub card_width: u32,
    /// Ask the rasterizer to skip any cached image
    pub cache_bust: bool,
    /// Device pixel ratio applied when rasterizing
    pub pixel_ratio: f32,
    /// Text placed before the padded number in derived hashtags
    pub hashtag_prefix: String,
    /// Width the number is zero-padded to in derived hashtags
    pub hashtag_pad: usize,
    /// What a manual hashtag edit does to later number changes
    pub hashtag_policy: HashtagPolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            export_filename: DEFAULT_EXPORT_FILENAME.to_string(),
            card_width: CARD_WIDTH,
            cache_bust: true,
            pixel_ratio: 1.0,
            hashtag_prefix: "onephotoaday".to_string(),
            hashtag_pad: 3,
            hashtag_policy: HashtagPolicy::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load a config from a JSON file. Missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.card_width != CARD_WIDTH && self.card_width != CARD_WIDTH_WIDE {
            return Err(Error::ConfigError(format!(
                "card_width must be {} or {}, got {}",
                CARD_WIDTH, CARD_WIDTH_WIDE, self.card_width
            )));
        }
        if !(self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 && self.pixel_ratio <= 8.0) {
            return Err(Error::ConfigError(format!(
                "pixel_ratio must be in (0, 8], got {}",
                self.pixel_ratio
            )));
        }
        if self.export_filename.trim().is_empty() {
            return Err(Error::ConfigError("export_filename must not be empty".into()));
        }
        Ok(())
    }
}

/// Width:height ratio of the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    /// 5:5
    #[default]
    Square,
    /// 4:5
    Portrait,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 2] = [AspectRatio::Square, AspectRatio::Portrait];

    /// `(width, height)` parts of the ratio
    pub fn parts(&self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (5, 5),
            AspectRatio::Portrait => (4, 5),
        }
    }

    /// Height of a card of the given width.
    pub fn height_for(&self, width: u32) -> u32 {
        let (w, h) = self.parts();
        width.saturating_mul(h) / w
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "square",
            AspectRatio::Portrait => "portrait",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" | "5/5" | "1/1" => Ok(AspectRatio::Square),
            "portrait" | "4/5" => Ok(AspectRatio::Portrait),
            other => Err(Error::ConfigError(format!("unknown aspect ratio '{}'", other))),
        }
    }
}
