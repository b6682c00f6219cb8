//! Layer variant model.
//!
//! A [`Layer`] carries the fields every shape shares (position, opacity, fill,
//! stroke) and a [`LayerKind`] holding the variant-specific ones. Reading a
//! corner radius or a font size requires matching the right variant first,
//! so "field not present on this kind" cannot be expressed as a read.
//!
//! On the wire the kind is flattened into the layer object with a `type` tag,
//! matching the shape the UI layer already consumes.

#[cfg(test)]
#[path = "layer_test.rs"]
mod layer_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::Rgb;
use crate::error::PatchError;

/// Unique identifier for a layer within a document.
pub type LayerId = Uuid;

/// Default font size for new text layers.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Fully opaque.
pub const MAX_OPACITY: u8 = 100;

/// Upper bound of `cornerRadius`.
pub const MAX_CORNER_RADIUS: f64 = 100.0;

// =============================================================================
// LAYER TYPE
// =============================================================================

/// Fieldless tag naming a layer's variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Rectangle,
    Ellipse,
    Path,
    Text,
}

impl LayerType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Path => "path",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TYPOGRAPHY
// =============================================================================

/// CSS font weight, restricted to the nine standard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum FontWeight {
    Thin,
    ExtraLight,
    Light,
    Regular,
    Medium,
    SemiBold,
    Bold,
    ExtraBold,
    Black,
}

impl FontWeight {
    pub const ALL: [FontWeight; 9] = [
        Self::Thin,
        Self::ExtraLight,
        Self::Light,
        Self::Regular,
        Self::Medium,
        Self::SemiBold,
        Self::Bold,
        Self::ExtraBold,
        Self::Black,
    ];

    #[must_use]
    pub fn value(self) -> u16 {
        match self {
            Self::Thin => 100,
            Self::ExtraLight => 200,
            Self::Light => 300,
            Self::Regular => 400,
            Self::Medium => 500,
            Self::SemiBold => 600,
            Self::Bold => 700,
            Self::ExtraBold => 800,
            Self::Black => 900,
        }
    }
}

impl TryFrom<u16> for FontWeight {
    type Error = PatchError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|w| w.value() == value)
            .ok_or_else(|| PatchError::InvalidValue {
                field: "fontWeight",
                reason: format!("{value} is not one of 100, 200, ..., 900"),
            })
    }
}

impl From<FontWeight> for u16 {
    fn from(weight: FontWeight) -> Self {
        weight.value()
    }
}

/// Font families offered by the typography panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    Inter,
    /// Older rooms stored the misspelling "Ariel".
    #[serde(alias = "Ariel")]
    Arial,
    #[serde(rename = "Times New Roman")]
    TimesNewRoman,
}

impl FontFamily {
    pub const ALL: [FontFamily; 3] = [Self::Inter, Self::Arial, Self::TimesNewRoman];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inter => "Inter",
            Self::Arial => "Arial",
            Self::TimesNewRoman => "Times New Roman",
        }
    }
}

impl FromStr for FontFamily {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Inter" => Ok(Self::Inter),
            "Arial" | "Ariel" => Ok(Self::Arial),
            "Times New Roman" => Ok(Self::TimesNewRoman),
            other => Err(PatchError::InvalidValue {
                field: "fontFamily",
                reason: format!("unknown font family {other:?}"),
            }),
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// VARIANTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleLayer {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub corner_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EllipseLayer {
    pub width: f64,
    pub height: f64,
}

/// Freehand drawing. `width`/`height` are the bounding box of `points` and
/// are maintained internally rather than edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathLayer {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    /// Polyline vertices relative to the layer's `x`/`y`.
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub font_size: f64,
    pub font_weight: FontWeight,
    pub font_family: FontFamily,
}

/// Variant-specific layer data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerKind {
    Rectangle(RectangleLayer),
    Ellipse(EllipseLayer),
    Path(PathLayer),
    Text(TextLayer),
}

// =============================================================================
// LAYER
// =============================================================================

/// One addressable element of the design document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub x: f64,
    pub y: f64,
    /// Percentage in `0..=100`.
    pub opacity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Rgb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Rgb>,
    #[serde(flatten)]
    pub kind: LayerKind,
}

impl Layer {
    fn with_kind(x: f64, y: f64, kind: LayerKind) -> Self {
        Self { x, y, opacity: MAX_OPACITY, fill: None, stroke: None, kind }
    }

    #[must_use]
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::with_kind(x, y, LayerKind::Rectangle(RectangleLayer { width, height, corner_radius: 0.0 }))
    }

    #[must_use]
    pub fn ellipse(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::with_kind(x, y, LayerKind::Ellipse(EllipseLayer { width, height }))
    }

    /// Build a path layer; the bounding box is derived from `points`.
    #[must_use]
    pub fn path(x: f64, y: f64, points: Vec<[f64; 2]>) -> Self {
        let (width, height) = points_extent(&points);
        Self::with_kind(x, y, LayerKind::Path(PathLayer { width, height, points }))
    }

    #[must_use]
    pub fn text(x: f64, y: f64, width: f64, height: f64, text: impl Into<String>) -> Self {
        Self::with_kind(
            x,
            y,
            LayerKind::Text(TextLayer {
                width,
                height,
                text: text.into(),
                font_size: DEFAULT_FONT_SIZE,
                font_weight: FontWeight::Regular,
                font_family: FontFamily::Inter,
            }),
        )
    }

    #[must_use]
    pub fn with_fill(mut self, fill: Rgb) -> Self {
        self.fill = Some(fill);
        self
    }

    #[must_use]
    pub fn with_stroke(mut self, stroke: Rgb) -> Self {
        self.stroke = Some(stroke);
        self
    }

    #[must_use]
    pub fn layer_type(&self) -> LayerType {
        match self.kind {
            LayerKind::Rectangle(_) => LayerType::Rectangle,
            LayerKind::Ellipse(_) => LayerType::Ellipse,
            LayerKind::Path(_) => LayerType::Path,
            LayerKind::Text(_) => LayerType::Text,
        }
    }

    /// Check every field against its value domain.
    ///
    /// # Errors
    ///
    /// `InvalidValue` naming the first field out of range.
    pub fn validate(&self) -> Result<(), PatchError> {
        check_finite("x", self.x)?;
        check_finite("y", self.y)?;
        check_opacity(self.opacity)?;
        match &self.kind {
            LayerKind::Rectangle(rect) => {
                check_extent("width", rect.width)?;
                check_extent("height", rect.height)?;
                check_corner_radius(rect.corner_radius)?;
            }
            LayerKind::Ellipse(ellipse) => {
                check_extent("width", ellipse.width)?;
                check_extent("height", ellipse.height)?;
            }
            LayerKind::Path(path) => {
                for &[px, py] in &path.points {
                    check_finite("points", px)?;
                    check_finite("points", py)?;
                }
            }
            LayerKind::Text(text) => {
                check_extent("width", text.width)?;
                check_extent("height", text.height)?;
                check_font_size(text.font_size)?;
            }
        }
        Ok(())
    }

    /// Recompute a path's bounding box from its points. No-op for other kinds.
    pub(crate) fn sync_extent(&mut self) {
        if let LayerKind::Path(path) = &mut self.kind {
            (path.width, path.height) = points_extent(&path.points);
        }
    }

    /// Width and height as shown in the layout panel. `None` for paths,
    /// whose extent follows their points.
    #[must_use]
    pub fn editable_size(&self) -> Option<(f64, f64)> {
        match &self.kind {
            LayerKind::Rectangle(r) => Some((r.width, r.height)),
            LayerKind::Ellipse(e) => Some((e.width, e.height)),
            LayerKind::Text(t) => Some((t.width, t.height)),
            LayerKind::Path(_) => None,
        }
    }
}

/// Bounding-box extent of a polyline: max minus min on each axis.
fn points_extent(points: &[[f64; 2]]) -> (f64, f64) {
    let Some(&[x0, y0]) = points.first() else {
        return (0.0, 0.0);
    };
    let (min_x, max_x, min_y, max_y) = points.iter().fold((x0, x0, y0, y0), |(lx, hx, ly, hy), [px, py]| {
        (lx.min(*px), hx.max(*px), ly.min(*py), hy.max(*py))
    });
    (max_x - min_x, max_y - min_y)
}

// =============================================================================
// VALUE DOMAINS
// =============================================================================

pub(crate) fn check_finite(field: &'static str, value: f64) -> Result<f64, PatchError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PatchError::InvalidValue { field, reason: format!("{value} is not a finite number") })
    }
}

/// Sizes: finite and not negative.
pub(crate) fn check_extent(field: &'static str, value: f64) -> Result<(), PatchError> {
    if check_finite(field, value)? < 0.0 {
        return Err(PatchError::InvalidValue { field, reason: format!("{value} is negative") });
    }
    Ok(())
}

pub(crate) fn check_corner_radius(value: f64) -> Result<(), PatchError> {
    check_extent("cornerRadius", value)?;
    if value > MAX_CORNER_RADIUS {
        return Err(PatchError::InvalidValue {
            field: "cornerRadius",
            reason: format!("{value} exceeds {MAX_CORNER_RADIUS}"),
        });
    }
    Ok(())
}

pub(crate) fn check_opacity(value: u8) -> Result<(), PatchError> {
    if value > MAX_OPACITY {
        return Err(PatchError::InvalidValue { field: "opacity", reason: format!("{value} exceeds {MAX_OPACITY}") });
    }
    Ok(())
}

pub(crate) fn check_font_size(value: f64) -> Result<(), PatchError> {
    if check_finite("fontSize", value)? <= 0.0 {
        return Err(PatchError::InvalidValue { field: "fontSize", reason: format!("{value} is not positive") });
    }
    Ok(())
}
