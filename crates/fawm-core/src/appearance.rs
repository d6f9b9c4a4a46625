//! Appearance settings: colors, font and decoration sizes.
//!
//! Every field has a default, so an absent or partial file is fine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::geometry::Metrics;

#[derive(Debug, thiserror::Error)]
pub enum AppearanceError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid appearance file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid appearance: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    /// Frame background while the client has input focus.
    pub focused_color: String,
    pub unfocused_color: String,
    /// Core X font name.
    pub font: String,
    pub border_size: i32,
    pub client_border_size: i32,
    pub frame_size: i32,
    pub resizable_corner_size: i32,
    /// Taskbar padding; the frame size when unset.
    pub padding: Option<i32>,
    pub popup_margin: i32,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            focused_color: "#ffb6c1".into(),
            unfocused_color: "#d3d3d3".into(),
            font: "fixed".into(),
            border_size: 1,
            client_border_size: 1,
            frame_size: 4,
            resizable_corner_size: 32,
            padding: None,
            popup_margin: 8,
        }
    }
}

impl Appearance {
    pub fn from_toml_str(content: &str) -> Result<Self, AppearanceError> {
        let appearance: Self = toml::from_str(content)?;
        appearance.validate()?;
        Ok(appearance)
    }

    pub fn load(path: &Path) -> Result<Self, AppearanceError> {
        let content = fs::read_to_string(path).map_err(|source| AppearanceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), AppearanceError> {
        if self.frame_size < 1 {
            return Err(AppearanceError::Invalid("frame_size must be at least 1".into()));
        }
        if self.resizable_corner_size < self.frame_size {
            return Err(AppearanceError::Invalid(
                "resizable_corner_size must not be smaller than frame_size".into(),
            ));
        }
        if self.border_size < 0 || self.client_border_size < 0 || self.popup_margin < 0 {
            return Err(AppearanceError::Invalid("sizes must not be negative".into()));
        }
        for color in [&self.focused_color, &self.unfocused_color] {
            if parse_hex_color(color).is_none() {
                return Err(AppearanceError::Invalid(format!("bad color {color:?}")));
            }
        }
        Ok(())
    }

    /// Metrics for a font of `font_height` pixels on a screen of the given
    /// size. Popup and clock widths are left for the backend to measure.
    pub fn metrics(&self, font_height: i32, screen_width: i32, screen_height: i32) -> Metrics {
        Metrics {
            border_size: self.border_size,
            client_border_size: self.client_border_size,
            frame_size: self.frame_size,
            resizable_corner_size: self.resizable_corner_size,
            title_height: font_height,
            padding: self.padding.unwrap_or(self.frame_size),
            font_height,
            popup_margin: self.popup_margin,
            popup_width: 2 * self.popup_margin,
            clock_width: 0,
            screen_width,
            screen_height,
        }
    }
}

/// Parse `#rrggbb` into 8-bit channels.
pub fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
