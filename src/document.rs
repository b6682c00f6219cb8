//! The shared design document: background color, layers, and z-order.
//!
//! `Document` is a plain value. All mutation goes through
//! [`crate::store::DocumentStore`], which serializes commits; the mutators
//! here are crate-private so the layer map and the z-order list can only
//! change together.

#[cfg(test)]
#[path = "document_test.rs"]
mod document_test;

use std::collections::HashMap;

use serde::Serialize;

use crate::color::Rgb;
use crate::error::PatchError;
use crate::layer::{Layer, LayerId};
use crate::patch::LayerPatch;

/// Commit counter. Incremented once per committed mutation.
pub type Revision = u64;

/// Room color used when none is configured (`#1e1e1e`).
pub const DEFAULT_BACKGROUND: Rgb = Rgb::new(30, 30, 30);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    background: Rgb,
    layers: HashMap<LayerId, Layer>,
    /// Back-to-front stacking order.
    layer_ids: Vec<LayerId>,
    revision: Revision,
}

impl Document {
    #[must_use]
    pub fn new(background: Rgb) -> Self {
        Self { background, layers: HashMap::new(), layer_ids: Vec::new(), revision: 0 }
    }

    #[must_use]
    pub fn background(&self) -> Rgb {
        self.background
    }

    #[must_use]
    pub fn revision(&self) -> Revision {
        self.revision
    }

    #[must_use]
    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &LayerId) -> bool {
        self.layers.contains_key(id)
    }

    /// Layer ids back-to-front.
    #[must_use]
    pub fn layer_ids(&self) -> &[LayerId] {
        &self.layer_ids
    }

    /// Layers back-to-front, paired with their ids.
    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &Layer)> {
        self.layer_ids
            .iter()
            .filter_map(|id| self.layers.get(id).map(|layer| (*id, layer)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layer_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layer_ids.is_empty()
    }

    /// True when the z-order and the layer map describe the same set of ids
    /// and the z-order holds no duplicates.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.layer_ids.len());
        self.layer_ids.len() == self.layers.len()
            && self
                .layer_ids
                .iter()
                .all(|id| seen.insert(*id) && self.layers.contains_key(id))
    }

    // -------------------------------------------------------------------------
    // crate-private mutators, driven by the store
    // -------------------------------------------------------------------------

    pub(crate) fn bump_revision(&mut self) -> Revision {
        self.revision += 1;
        self.revision
    }

    /// Returns false when the color is unchanged.
    pub(crate) fn set_background(&mut self, color: Rgb) -> bool {
        let changed = self.background != color;
        self.background = color;
        changed
    }

    /// Add a layer on top of the stack. Returns false if the id is taken.
    pub(crate) fn insert(&mut self, id: LayerId, layer: Layer) -> bool {
        if self.layers.contains_key(&id) {
            return false;
        }
        self.layers.insert(id, layer);
        self.layer_ids.push(id);
        true
    }

    pub(crate) fn remove(&mut self, id: &LayerId) -> Option<Layer> {
        let layer = self.layers.remove(id)?;
        self.layer_ids.retain(|existing| existing != id);
        Some(layer)
    }

    /// Validate then apply `patch` to the layer at `id`.
    pub(crate) fn patch(&mut self, id: &LayerId, patch: &LayerPatch) -> Result<(), PatchError> {
        let layer = self.layers.get_mut(id).ok_or(PatchError::LayerNotFound(*id))?;
        patch.validate(layer)?;
        patch.apply(layer);
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_BACKGROUND)
    }
}
