//! Room — one shared document plus the presence of everyone editing it.
//!
//! DESIGN
//! ======
//! `Room` is cheap to clone (both halves are `Arc`-backed) and is what a
//! transport layer holds per document. Each connected client gets a
//! [`Session`]: the only handle that can write that client's presence, and
//! the entry point for its mutations (which are tagged with its id so peers
//! can tell their own echoes apart).
//!
//! LIFECYCLE
//! =========
//! 1. `Room::connect(client_id)` → presence entry created, `Session` returned
//! 2. session edits selection / issues mutations
//! 3. `Session::disconnect()` (or `Room::disconnect` from the host when the
//!    connection drops) → presence entry destroyed
//!
//! Disconnecting never touches the document: whatever the last committed
//! mutation produced stays.

#[cfg(test)]
#[path = "room_test.rs"]
mod room_test;

use tokio::sync::watch;
use tracing::info;

use crate::color::Rgb;
use crate::config::RoomConfig;
use crate::document::{Document, Revision};
use crate::engine::{self, UpdateOutcome};
use crate::error::{MutationError, PatchError, PresenceError};
use crate::layer::{Layer, LayerId};
use crate::patch::{LayerPatch, LayerUpdate};
use crate::presence::{ClientId, Point, Presence, PresenceChannel};
use crate::store::DocumentStore;

// =============================================================================
// ROOM
// =============================================================================

#[derive(Clone)]
pub struct Room {
    store: DocumentStore,
    presence: PresenceChannel,
}

impl Room {
    #[must_use]
    pub fn new(config: &RoomConfig) -> Self {
        Self {
            store: DocumentStore::new(Document::new(config.background), config.event_capacity),
            presence: PresenceChannel::new(config.presence_capacity),
        }
    }

    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    #[must_use]
    pub fn presence(&self) -> &PresenceChannel {
        &self.presence
    }

    /// Create the client's presence entry and hand back its session.
    ///
    /// # Errors
    ///
    /// `AlreadyConnected` if the client slot is taken.
    pub fn connect(&self, client_id: ClientId) -> Result<Session, PresenceError> {
        self.presence.connect(client_id)?;
        info!(%client_id, revision = self.store.revision(), "client connected");
        Ok(Session { client_id, room: self.clone() })
    }

    /// Host-side disconnect for a client whose connection went away.
    /// Returns false if the client was not connected.
    pub fn disconnect(&self, client_id: &ClientId) -> bool {
        let removed = self.presence.disconnect(client_id);
        if removed {
            info!(%client_id, "client disconnected");
        }
        removed
    }
}

impl Default for Room {
    fn default() -> Self {
        Self::new(&RoomConfig::default())
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// A connected client's handle to a room.
pub struct Session {
    client_id: ClientId,
    room: Room,
}

impl Session {
    #[must_use]
    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    #[must_use]
    pub fn room(&self) -> &Room {
        &self.room
    }

    // -------------------------------------------------------------------------
    // presence
    // -------------------------------------------------------------------------

    /// Replace this client's selection.
    ///
    /// # Errors
    ///
    /// `NotConnected` if the host already disconnected this client.
    pub fn set_selection(&self, ids: impl IntoIterator<Item = LayerId>) -> Result<(), PresenceError> {
        if self.room.presence.set_selection(&self.client_id, ids) {
            Ok(())
        } else {
            Err(PresenceError::NotConnected(self.client_id))
        }
    }

    #[must_use]
    pub fn selection(&self) -> Vec<LayerId> {
        self.room.presence.selection(&self.client_id)
    }

    /// # Errors
    ///
    /// `NotConnected` if the host already disconnected this client.
    pub fn set_cursor(&self, cursor: Option<Point>) -> Result<(), PresenceError> {
        if self.room.presence.set_cursor(&self.client_id, cursor) {
            Ok(())
        } else {
            Err(PresenceError::NotConnected(self.client_id))
        }
    }

    /// Subscribe to this client's own presence entry.
    ///
    /// # Errors
    ///
    /// `NotConnected` if the host already disconnected this client.
    pub fn watch_presence(&self) -> Result<watch::Receiver<Presence>, PresenceError> {
        self.room
            .presence
            .watch(&self.client_id)
            .ok_or(PresenceError::NotConnected(self.client_id))
    }

    // -------------------------------------------------------------------------
    // document
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn subscribe_document(&self) -> watch::Receiver<Document> {
        self.room.store.subscribe()
    }

    /// See [`engine::update_selected_layer`].
    ///
    /// # Errors
    ///
    /// Invalid colors, variant mismatches, and out-of-domain values.
    pub fn update_selected_layer(&self, update: LayerUpdate) -> Result<UpdateOutcome, MutationError> {
        engine::update_selected_layer(&self.room, self.client_id, update)
    }

    /// See [`engine::set_fill_and_stroke`].
    ///
    /// # Errors
    ///
    /// Invalid colors.
    pub fn set_fill_and_stroke(&self, hex: &str) -> Result<UpdateOutcome, MutationError> {
        engine::set_fill_and_stroke(&self.room, self.client_id, hex)
    }

    pub fn set_background(&self, color: Rgb) -> Revision {
        self.room.store.set_background_from(Some(self.client_id), color)
    }

    /// # Errors
    ///
    /// Invalid colors.
    pub fn set_background_hex(&self, hex: &str) -> Result<Revision, MutationError> {
        engine::set_background_hex(&self.room, self.client_id, hex)
    }

    /// Patch a layer by id, bypassing the selection.
    ///
    /// # Errors
    ///
    /// See [`DocumentStore::patch_layer`].
    pub fn patch_layer(&self, id: LayerId, patch: LayerPatch) -> Result<Revision, PatchError> {
        self.room.store.patch_layer_from(Some(self.client_id), id, patch)
    }

    /// # Errors
    ///
    /// `InvalidValue` if a field of `layer` is outside its domain.
    pub fn insert_layer(&self, layer: Layer) -> Result<LayerId, PatchError> {
        self.room.store.insert_layer_from(Some(self.client_id), layer)
    }

    /// # Errors
    ///
    /// `LayerNotFound` if `id` is not in the document.
    pub fn remove_layer(&self, id: LayerId) -> Result<Layer, PatchError> {
        self.room.store.remove_layer_from(Some(self.client_id), id)
    }

    /// Destroy this client's presence entry.
    pub fn disconnect(self) -> bool {
        self.room.disconnect(&self.client_id)
    }
}
