//! Color model: RGB triples and their CSS hex form.
//!
//! The document stores colors only as decoded [`Rgb`] values. Hex strings
//! exist at the UI boundary and are converted here on the way in
//! ([`hex_to_rgb`]) and on the way out ([`rgb_to_css`], [`color_to_css`]).

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

/// CSS value rendered for an absent fill or stroke.
pub const TRANSPARENT: &str = "transparent";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("invalid color {0:?}: expected 6 hex digits with optional leading '#'")]
    InvalidFormat(String),
}

impl ErrorCode for ColorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) => "E_INVALID_COLOR",
        }
    }
}

/// An 8-bit-per-channel RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Parse a 6-digit hex color, with or without a leading `#`.
///
/// # Errors
///
/// Returns `InvalidFormat` for anything other than exactly six hex digits.
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, ColorError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidFormat(hex.to_string()));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ColorError::InvalidFormat(hex.to_string()))
    };
    Ok(Rgb { r: channel(0)?, g: channel(2)?, b: channel(4)? })
}

/// Render a color as canonical lowercase `#rrggbb`. The `#` is always
/// present, so `rrggbb` input comes back prefixed.
#[must_use]
pub fn rgb_to_css(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)
}

/// Render an optional color, falling back to [`TRANSPARENT`].
#[must_use]
pub fn color_to_css(rgb: Option<Rgb>) -> String {
    rgb.map_or_else(|| TRANSPARENT.to_string(), rgb_to_css)
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex_to_rgb(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&rgb_to_css(*self))
    }
}
