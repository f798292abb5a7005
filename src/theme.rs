//! Color themes for the card.
//!
//! A theme is three colors: the card background, the text color and the
//! border color. Themes live in a fixed registry built once on first use and
//! are always referenced by [`ThemeId`], never copied into form state.
//!
//! ```
//! use art_prompt::theme::{registry, ThemeId};
//!
//! let classic = registry().get(ThemeId::Classic);
//! assert_eq!(classic.background.to_hex(), "#FFF4B8");
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An opaque 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::from_rgb_int(0xffffff);
    pub const BLACK: Rgba = Rgba::from_rgb_int(0x000000);

    /// Build an opaque color from a `0xRRGGBB` integer.
    pub const fn from_rgb_int(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 255,
        }
    }

    /// Parse `#RRGGBB` or `RRGGBB`.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches('#');
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        u32::from_str_radix(s, 16).ok().map(Self::from_rgb_int)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Identifier of a registered theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeId {
    /// Pale yellow card, red ink
    #[default]
    Classic,
    Midnight,
    Forest,
    Ocean,
    Mono,
}

impl ThemeId {
    pub const ALL: [ThemeId; 5] = [
        ThemeId::Classic,
        ThemeId::Midnight,
        ThemeId::Forest,
        ThemeId::Ocean,
        ThemeId::Mono,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeId::Classic => "classic",
            ThemeId::Midnight => "midnight",
            ThemeId::Forest => "forest",
            ThemeId::Ocean => "ocean",
            ThemeId::Mono => "mono",
        }
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        ThemeId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| Error::ConfigError(format!("unknown theme '{}'", s)))
    }
}

/// A named, immutable set of the three theme-bound colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub id: ThemeId,
    pub name: &'static str,
    pub background: Rgba,
    pub text: Rgba,
    pub border: Rgba,
}

/// Lookup table from [`ThemeId`] to [`Theme`]
#[derive(Debug)]
pub struct ThemeRegistry {
    themes: Vec<Theme>,
}

impl ThemeRegistry {
    fn builtin() -> Self {
        let themes = vec![
            Theme {
                id: ThemeId::Classic,
                name: "Classic",
                background: Rgba::from_rgb_int(0xfff4b8),
                text: Rgba::from_rgb_int(0xdc2626), // red-600
                border: Rgba::from_rgb_int(0xdc2626),
            },
            Theme {
                id: ThemeId::Midnight,
                name: "Midnight",
                background: Rgba::from_rgb_int(0x1e1b4b),
                text: Rgba::from_rgb_int(0xfde68a),
                border: Rgba::from_rgb_int(0xfbbf24),
            },
            Theme {
                id: ThemeId::Forest,
                name: "Forest",
                background: Rgba::from_rgb_int(0xecfccb),
                text: Rgba::from_rgb_int(0x166534),
                border: Rgba::from_rgb_int(0x15803d),
            },
            Theme {
                id: ThemeId::Ocean,
                name: "Ocean",
                background: Rgba::from_rgb_int(0xe0f2fe),
                text: Rgba::from_rgb_int(0x1e3a8a),
                border: Rgba::from_rgb_int(0x2563eb),
            },
            Theme {
                id: ThemeId::Mono,
                name: "Mono",
                background: Rgba::WHITE,
                text: Rgba::from_rgb_int(0x171717),
                border: Rgba::from_rgb_int(0x171717),
            },
        ];
        Self { themes }
    }

    /// Every id has an entry, so lookups cannot miss.
    pub fn get(&self, id: ThemeId) -> &Theme {
        self.themes
            .iter()
            .find(|t| t.id == id)
            .unwrap_or(&self.themes[0])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Theme> {
        self.themes.iter()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

static REGISTRY: OnceLock<ThemeRegistry> = OnceLock::new();

/// The process-wide theme registry.
pub fn registry() -> &'static ThemeRegistry {
    REGISTRY.get_or_init(ThemeRegistry::builtin)
}
