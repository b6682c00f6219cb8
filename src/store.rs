//! Shared document store — transactional commits and subscriptions.
//!
//! DESIGN
//! ======
//! The authoritative `Document` lives inside a `tokio::sync::watch` channel.
//! Every mutation runs inside `send_if_modified`, which holds the channel's
//! write lock for the whole validate-merge-write sequence: a patch is either
//! committed with all of its fields or not at all, and readers only ever
//! borrow whole committed states.
//!
//! Two read paths:
//! - `subscribe()` returns a `watch::Receiver` that always holds the latest
//!   committed document (intermediate states may coalesce).
//! - `events()` returns a `broadcast::Receiver` of per-commit `DocEvent`s,
//!   published while the write lock is held so event order equals revision
//!   order.
//!
//! CONFLICTS
//! =========
//! Commits are applied in lock-acquisition order and a patch writes only the
//! fields it carries. Two clients patching different fields of the same layer
//! both land; two clients patching the same field resolve last-writer-wins.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::color::Rgb;
use crate::document::{Document, Revision};
use crate::error::PatchError;
use crate::layer::{Layer, LayerId};
use crate::patch::LayerPatch;
use crate::presence::ClientId;

// =============================================================================
// EVENTS
// =============================================================================

/// What a single commit changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    BackgroundSet { color: Rgb },
    LayerInserted { id: LayerId, layer: Layer },
    LayerPatched { id: LayerId, patch: LayerPatch },
    LayerRemoved { id: LayerId },
}

/// One committed mutation, as delivered to peers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocEvent {
    pub revision: Revision,
    /// Client that issued the mutation; `None` for host-side writes.
    pub origin: Option<ClientId>,
    pub change: Change,
}

// =============================================================================
// STORE
// =============================================================================

/// Handle to a room's document. Clones share the same document.
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    doc: watch::Sender<Document>,
    events: broadcast::Sender<DocEvent>,
}

impl DocumentStore {
    /// Create a store around `initial`. `event_capacity` bounds how many
    /// undelivered events a slow subscriber may lag behind before it starts
    /// losing the oldest ones.
    #[must_use]
    pub fn new(initial: Document, event_capacity: usize) -> Self {
        let (doc, _) = watch::channel(initial);
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self { inner: Arc::new(StoreInner { doc, events }) }
    }

    // -------------------------------------------------------------------------
    // reads
    // -------------------------------------------------------------------------

    /// Look up a layer by id.
    #[must_use]
    pub fn get(&self, id: &LayerId) -> Option<Layer> {
        self.inner.doc.borrow().get(id).cloned()
    }

    /// Clone of the latest committed document.
    #[must_use]
    pub fn snapshot(&self) -> Document {
        self.inner.doc.borrow().clone()
    }

    #[must_use]
    pub fn revision(&self) -> Revision {
        self.inner.doc.borrow().revision()
    }

    /// Latest-value subscription, notified on every commit.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Document> {
        self.inner.doc.subscribe()
    }

    /// Ordered per-commit event stream.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<DocEvent> {
        self.inner.events.subscribe()
    }

    // -------------------------------------------------------------------------
    // writes
    // -------------------------------------------------------------------------

    /// Replace the room background. Setting the current color commits nothing.
    pub fn set_background(&self, color: Rgb) -> Revision {
        self.set_background_from(None, color)
    }

    pub(crate) fn set_background_from(&self, origin: Option<ClientId>, color: Rgb) -> Revision {
        let committed = self.commit(origin, |doc| Ok(doc.set_background(color).then_some(Change::BackgroundSet { color })));
        committed.unwrap_or_else(|_| self.revision())
    }

    /// Merge the fields present in `patch` into the layer at `id`.
    ///
    /// Returns the revision after the call; an empty patch commits nothing and
    /// returns the current revision.
    ///
    /// # Errors
    ///
    /// `LayerNotFound` if `id` is not in the document, `VariantFieldMismatch`
    /// if a field does not exist on the layer's variant, `InvalidValue` if a
    /// value is outside its domain. The document is untouched on error.
    pub fn patch_layer(&self, id: LayerId, patch: LayerPatch) -> Result<Revision, PatchError> {
        self.patch_layer_from(None, id, patch)
    }

    pub(crate) fn patch_layer_from(
        &self,
        origin: Option<ClientId>,
        id: LayerId,
        patch: LayerPatch,
    ) -> Result<Revision, PatchError> {
        self.commit(origin, |doc| {
            if !doc.contains(&id) {
                return Err(PatchError::LayerNotFound(id));
            }
            if patch.is_empty() {
                return Ok(None);
            }
            doc.patch(&id, &patch)?;
            Ok(Some(Change::LayerPatched { id, patch }))
        })
    }

    /// Add `layer` on top of the z-order and return its new id. A path's
    /// extent is recomputed from its points before it is stored.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if a field is outside its domain; nothing is written.
    pub fn insert_layer(&self, layer: Layer) -> Result<LayerId, PatchError> {
        self.insert_layer_from(None, layer)
    }

    pub(crate) fn insert_layer_from(&self, origin: Option<ClientId>, mut layer: Layer) -> Result<LayerId, PatchError> {
        layer.validate()?;
        layer.sync_extent();
        let id = Uuid::new_v4();
        self.commit(origin, |doc| {
            let change = Change::LayerInserted { id, layer: layer.clone() };
            Ok(doc.insert(id, layer).then_some(change))
        })?;
        Ok(id)
    }

    /// Remove a layer and its z-order entry.
    ///
    /// # Errors
    ///
    /// `LayerNotFound` if `id` is not in the document.
    pub fn remove_layer(&self, id: LayerId) -> Result<Layer, PatchError> {
        self.remove_layer_from(None, id)
    }

    pub(crate) fn remove_layer_from(&self, origin: Option<ClientId>, id: LayerId) -> Result<Layer, PatchError> {
        let mut removed = None;
        self.commit(origin, |doc| {
            removed = doc.remove(&id);
            if removed.is_some() {
                Ok(Some(Change::LayerRemoved { id }))
            } else {
                Err(PatchError::LayerNotFound(id))
            }
        })?;
        removed.ok_or(PatchError::LayerNotFound(id))
    }

    /// Run `mutate` under the document write lock. `Ok(Some(change))` commits:
    /// the revision is bumped and the event published before the lock is
    /// released. `Ok(None)` and `Err` leave the document untouched and notify
    /// nobody.
    fn commit<F>(&self, origin: Option<ClientId>, mutate: F) -> Result<Revision, PatchError>
    where
        F: FnOnce(&mut Document) -> Result<Option<Change>, PatchError>,
    {
        let mut outcome = None;
        self.inner.doc.send_if_modified(|doc| match mutate(doc) {
            Ok(Some(change)) => {
                let revision = doc.bump_revision();
                debug!(revision, ?origin, "document commit");
                if self.inner.events.send(DocEvent { revision, origin, change }).is_err() {
                    trace!(revision, "no document event subscribers");
                }
                outcome = Some(Ok(revision));
                true
            }
            Ok(None) => {
                outcome = Some(Ok(doc.revision()));
                false
            }
            Err(e) => {
                outcome = Some(Err(e));
                false
            }
        });
        // send_if_modified always runs the closure.
        outcome.unwrap_or_else(|| Ok(self.revision()))
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(Document::default(), crate::config::DEFAULT_EVENT_CAPACITY)
    }
}
