//! Partial layer updates.
//!
//! DESIGN
//! ======
//! Two shapes of the same idea:
//! - [`LayerUpdate`] is what the property panels send: raw numbers and hex
//!   strings, any subset of fields.
//! - [`LayerPatch`] is the typed form the store accepts: colors decoded,
//!   ranges clamped, enumerations resolved.
//!
//! `LayerUpdate::into_patch` performs the conversion; `LayerPatch::validate`
//! checks a patch against a concrete layer's variant and value domains, and
//! `LayerPatch::apply` writes the present fields. The store always validates
//! before applying so a rejected patch never leaves a layer half-written.

#[cfg(test)]
#[path = "patch_test.rs"]
mod patch_test;

use serde::{Deserialize, Serialize};

use crate::color::{Rgb, hex_to_rgb};
use crate::error::{MutationError, PatchError};
use crate::layer::{
    FontFamily, FontWeight, Layer, LayerKind, LayerType, MAX_CORNER_RADIUS, MAX_OPACITY, check_corner_radius,
    check_extent, check_finite, check_font_size, check_opacity,
};

// =============================================================================
// UI UPDATE
// =============================================================================

/// Sparse update as issued by the property panels. Only present fields apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Percentage; clamped to `0..=100` and rounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Clamped to `0..=100`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    /// Hex color, `#rrggbb` or `rrggbb`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Hex color, `#rrggbb` or `rrggbb`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl LayerUpdate {
    /// Convert panel input into a typed patch.
    ///
    /// # Errors
    ///
    /// `Color` for a malformed hex string; `Patch(InvalidValue)` for a
    /// non-finite number, an unknown font weight, or an unknown family.
    pub fn into_patch(self) -> Result<LayerPatch, MutationError> {
        let opacity = self
            .opacity
            .map(|v| check_finite("opacity", v).map(clamp_opacity))
            .transpose()?;
        let corner_radius = self
            .corner_radius
            .map(|v| check_finite("cornerRadius", v).map(|v| v.clamp(0.0, MAX_CORNER_RADIUS)))
            .transpose()?;

        Ok(LayerPatch {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            opacity,
            corner_radius,
            fill: self.fill.as_deref().map(hex_to_rgb).transpose()?,
            stroke: self.stroke.as_deref().map(hex_to_rgb).transpose()?,
            font_size: self.font_size,
            font_weight: self.font_weight.map(FontWeight::try_from).transpose()?,
            font_family: self.font_family.as_deref().map(str::parse::<FontFamily>).transpose()?,
            text: self.text,
        })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_opacity(value: f64) -> u8 {
    // Clamped into 0..=100 first, so the cast is exact.
    value.round().clamp(0.0, f64::from(MAX_OPACITY)) as u8
}

// =============================================================================
// TYPED PATCH
// =============================================================================

/// Typed sparse update accepted by the document store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<FontFamily>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl LayerPatch {
    /// True when no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Names of the fields this patch carries, in declaration order.
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        let present = [
            ("x", self.x.is_some()),
            ("y", self.y.is_some()),
            ("width", self.width.is_some()),
            ("height", self.height.is_some()),
            ("opacity", self.opacity.is_some()),
            ("cornerRadius", self.corner_radius.is_some()),
            ("fill", self.fill.is_some()),
            ("stroke", self.stroke.is_some()),
            ("fontSize", self.font_size.is_some()),
            ("fontWeight", self.font_weight.is_some()),
            ("fontFamily", self.font_family.is_some()),
            ("text", self.text.is_some()),
        ];
        present.into_iter().filter_map(|(name, set)| set.then_some(name)).collect()
    }

    /// Check the patch against `layer` without modifying it.
    ///
    /// # Errors
    ///
    /// `VariantFieldMismatch` when a field does not exist on the layer's
    /// variant (or is not editable, like a path's size); `InvalidValue` when
    /// a value is outside its domain.
    pub fn validate(&self, layer: &Layer) -> Result<(), PatchError> {
        let kind = layer.layer_type();
        let mismatch = |field: &'static str| PatchError::VariantFieldMismatch { field, kind: kind.as_str() };

        if kind == LayerType::Path {
            if self.width.is_some() {
                return Err(mismatch("width"));
            }
            if self.height.is_some() {
                return Err(mismatch("height"));
            }
        }
        if kind != LayerType::Rectangle && self.corner_radius.is_some() {
            return Err(mismatch("cornerRadius"));
        }
        if kind != LayerType::Text {
            let text_fields = [
                ("fontSize", self.font_size.is_some()),
                ("fontWeight", self.font_weight.is_some()),
                ("fontFamily", self.font_family.is_some()),
                ("text", self.text.is_some()),
            ];
            if let Some((field, _)) = text_fields.into_iter().find(|(_, set)| *set) {
                return Err(mismatch(field));
            }
        }

        for (field, value) in [("x", self.x), ("y", self.y)] {
            if let Some(v) = value {
                check_finite(field, v)?;
            }
        }
        for (field, value) in [("width", self.width), ("height", self.height)] {
            if let Some(v) = value {
                check_extent(field, v)?;
            }
        }
        if let Some(radius) = self.corner_radius {
            check_corner_radius(radius)?;
        }
        if let Some(opacity) = self.opacity {
            check_opacity(opacity)?;
        }
        if let Some(size) = self.font_size {
            check_font_size(size)?;
        }
        Ok(())
    }

    /// Write every present field into `layer`. Callers validate first.
    pub(crate) fn apply(&self, layer: &mut Layer) {
        if let Some(x) = self.x {
            layer.x = x;
        }
        if let Some(y) = self.y {
            layer.y = y;
        }
        if let Some(opacity) = self.opacity {
            layer.opacity = opacity;
        }
        if let Some(fill) = self.fill {
            layer.fill = Some(fill);
        }
        if let Some(stroke) = self.stroke {
            layer.stroke = Some(stroke);
        }

        match &mut layer.kind {
            LayerKind::Rectangle(rect) => {
                set_size(&mut rect.width, &mut rect.height, self);
                if let Some(r) = self.corner_radius {
                    rect.corner_radius = r;
                }
            }
            LayerKind::Ellipse(ellipse) => set_size(&mut ellipse.width, &mut ellipse.height, self),
            LayerKind::Path(_) => {}
            LayerKind::Text(text) => {
                set_size(&mut text.width, &mut text.height, self);
                if let Some(size) = self.font_size {
                    text.font_size = size;
                }
                if let Some(weight) = self.font_weight {
                    text.font_weight = weight;
                }
                if let Some(family) = self.font_family {
                    text.font_family = family;
                }
                if let Some(content) = &self.text {
                    text.text.clone_from(content);
                }
            }
        }
    }
}

fn set_size(width: &mut f64, height: &mut f64, patch: &LayerPatch) {
    if let Some(w) = patch.width {
        *width = w;
    }
    if let Some(h) = patch.height {
        *height = h;
    }
}
