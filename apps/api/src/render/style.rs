//! Style bundle resolution: stored profile preferences → concrete CSS values.
//!
//! Every field falls back to a fixed default when absent or blank. Present
//! values are re-checked against the same allow-lists the profile editor
//! enforces, since the rendered document is the last stop before they are
//! interpolated into CSS.

use serde::Serialize;
use thiserror::Error;

use crate::models::profile::{non_empty, StyleSettings};

pub const DEFAULT_FULL_NAME_COLOR: &str = "#1a1a1a";
pub const DEFAULT_CURRENT_ROLE_COLOR: &str = "#4f46e5";
pub const DEFAULT_TEXT_COLOR: &str = "#000000";
pub const DEFAULT_BG_COLOR: &str = "#ffffff";
pub const DEFAULT_HEADING_FONT: &str = "Helvetica, sans-serif";
pub const DEFAULT_TEXT_FONT: &str = "Arial, sans-serif";
pub const DEFAULT_LINE_HEIGHT: &str = "1.5";

/// Values that are not user-configurable.
pub const FONT_SIZE: &str = "12px";
pub const H3_COLOR: &str = "#000000";
pub const H4_COLOR: &str = "#4e4e4e";

pub const ALLOWED_FONTS: &[&str] = &[
    "Arial, sans-serif",
    "Helvetica, sans-serif",
    "Times New Roman, serif",
    "Georgia, serif",
    "Verdana, sans-serif",
    "Courier New, monospace",
];

pub const ALLOWED_LINE_HEIGHTS: &[&str] = &["1.0", "1.2", "1.4", "1.5", "1.6", "1.8", "2.0"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StyleError {
    #[error("Invalid {field} color format: {value}")]
    Color { field: &'static str, value: String },

    #[error("Invalid {field}: {value}")]
    Font { field: &'static str, value: String },

    #[error("Invalid line height: {0}")]
    LineHeight(String),
}

/// Concrete, validated CSS values for one rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedStyle {
    pub full_name_color: String,
    pub current_role_color: String,
    pub text_color: String,
    pub bg_color: String,
    pub heading_font: String,
    pub text_font: String,
    pub line_height: String,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self {
            full_name_color: DEFAULT_FULL_NAME_COLOR.to_string(),
            current_role_color: DEFAULT_CURRENT_ROLE_COLOR.to_string(),
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            bg_color: DEFAULT_BG_COLOR.to_string(),
            heading_font: DEFAULT_HEADING_FONT.to_string(),
            text_font: DEFAULT_TEXT_FONT.to_string(),
            line_height: DEFAULT_LINE_HEIGHT.to_string(),
        }
    }
}

impl ResolvedStyle {
    pub fn resolve(settings: Option<&StyleSettings>) -> Result<Self, StyleError> {
        let Some(s) = settings else {
            return Ok(Self::default());
        };

        Ok(Self {
            full_name_color: color("full name", &s.full_name_color, DEFAULT_FULL_NAME_COLOR)?,
            current_role_color: color(
                "position title",
                &s.current_role_color,
                DEFAULT_CURRENT_ROLE_COLOR,
            )?,
            text_color: color("text", &s.text_color, DEFAULT_TEXT_COLOR)?,
            bg_color: color("background", &s.bg_color, DEFAULT_BG_COLOR)?,
            heading_font: font("heading font", &s.heading_font, DEFAULT_HEADING_FONT)?,
            text_font: font("text font", &s.text_font, DEFAULT_TEXT_FONT)?,
            line_height: line_height(&s.line_height)?,
        })
    }
}

/// `#RGB` or `#RRGGBB`, case-insensitive.
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

fn color(field: &'static str, value: &Option<String>, default: &str) -> Result<String, StyleError> {
    match non_empty(value) {
        None => Ok(default.to_string()),
        Some(v) if is_hex_color(v) => Ok(v.to_string()),
        Some(v) => Err(StyleError::Color {
            field,
            value: v.to_string(),
        }),
    }
}

fn font(field: &'static str, value: &Option<String>, default: &str) -> Result<String, StyleError> {
    match non_empty(value) {
        None => Ok(default.to_string()),
        Some(v) if ALLOWED_FONTS.contains(&v) => Ok(v.to_string()),
        Some(v) => Err(StyleError::Font {
            field,
            value: v.to_string(),
        }),
    }
}

fn line_height(value: &Option<String>) -> Result<String, StyleError> {
    match non_empty(value) {
        None => Ok(DEFAULT_LINE_HEIGHT.to_string()),
        Some(v) if ALLOWED_LINE_HEIGHTS.contains(&v) => Ok(v.to_string()),
        Some(v) => Err(StyleError::LineHeight(v.to_string())),
    }
}
