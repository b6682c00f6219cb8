//! Presence channel — per-client selection and cursor, shared with peers.
//!
//! DESIGN
//! ======
//! Presence is ephemeral and never part of the document. Each connected
//! client owns exactly one entry, held in a `watch` channel so the client's
//! UI can subscribe to its own selection while peers read snapshots.
//! Writes are crate-private and reached only through the owning client's
//! [`crate::room::Session`], which makes each entry single-writer without
//! any locking beyond the map itself.
//!
//! LIFECYCLE
//! =========
//! 1. `connect` creates an entry with an empty selection → `Joined`
//! 2. selection/cursor writes replace the entry → `SelectionChanged` /
//!    `CursorMoved` (only when the value actually changed)
//! 3. `disconnect` destroys the entry → `Left`
//!
//! Selection is advisory: two clients may select the same layer.

#[cfg(test)]
#[path = "presence_test.rs"]
mod presence_test;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{info, trace};
use uuid::Uuid;

use crate::error::PresenceError;
use crate::layer::LayerId;

/// Opaque identifier of one connected client.
pub type ClientId = Uuid;

/// Cursor position in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One client's presence record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Presence {
    /// Ordered set of selected layers.
    pub selection: Vec<LayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Point>,
}

impl Presence {
    /// The single selected layer, if exactly one is selected.
    #[must_use]
    pub fn single_selection(&self) -> Option<LayerId> {
        match self.selection.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }
}

/// Presence change delivered to every peer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PresenceEvent {
    Joined { client_id: ClientId },
    Left { client_id: ClientId },
    SelectionChanged { client_id: ClientId, selection: Vec<LayerId> },
    CursorMoved { client_id: ClientId, cursor: Option<Point> },
}

/// Drop repeated ids, keeping the first occurrence of each.
fn ordered_set(ids: impl IntoIterator<Item = LayerId>) -> Vec<LayerId> {
    let mut out: Vec<LayerId> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

// =============================================================================
// CHANNEL
// =============================================================================

/// Map from client to presence entry. Clones share the same map.
#[derive(Clone)]
pub struct PresenceChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    entries: RwLock<HashMap<ClientId, watch::Sender<Presence>>>,
    events: broadcast::Sender<PresenceEvent>,
}

impl PresenceChannel {
    #[must_use]
    pub fn new(event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self { inner: Arc::new(ChannelInner { entries: RwLock::new(HashMap::new()), events }) }
    }

    // -------------------------------------------------------------------------
    // reads
    // -------------------------------------------------------------------------

    /// Current selection of `client_id`; empty for unknown clients.
    #[must_use]
    pub fn selection(&self, client_id: &ClientId) -> Vec<LayerId> {
        self.presence(client_id).map(|p| p.selection).unwrap_or_default()
    }

    #[must_use]
    pub fn presence(&self, client_id: &ClientId) -> Option<Presence> {
        let entries = self.inner.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(client_id).map(|tx| tx.borrow().clone())
    }

    /// Subscribe to one client's presence entry.
    #[must_use]
    pub fn watch(&self, client_id: &ClientId) -> Option<watch::Receiver<Presence>> {
        let entries = self.inner.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(client_id).map(watch::Sender::subscribe)
    }

    #[must_use]
    pub fn is_connected(&self, client_id: &ClientId) -> bool {
        let entries = self.inner.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(client_id)
    }

    /// Connected clients, sorted for stable output.
    #[must_use]
    pub fn peers(&self) -> Vec<ClientId> {
        let entries = self.inner.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<ClientId> = entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Stream of presence changes from every client.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<PresenceEvent> {
        self.inner.events.subscribe()
    }

    // -------------------------------------------------------------------------
    // lifecycle
    // -------------------------------------------------------------------------

    pub(crate) fn connect(&self, client_id: ClientId) -> Result<(), PresenceError> {
        let mut entries = self.inner.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&client_id) {
            return Err(PresenceError::AlreadyConnected(client_id));
        }
        let (tx, _) = watch::channel(Presence::default());
        entries.insert(client_id, tx);
        info!(%client_id, peers = entries.len(), "presence joined");
        self.publish(PresenceEvent::Joined { client_id });
        Ok(())
    }

    /// Destroy the entry. Returns false if the client was not connected.
    pub(crate) fn disconnect(&self, client_id: &ClientId) -> bool {
        let mut entries = self.inner.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(client_id).is_none() {
            return false;
        }
        info!(%client_id, peers = entries.len(), "presence left");
        self.publish(PresenceEvent::Left { client_id: *client_id });
        true
    }

    // -------------------------------------------------------------------------
    // owner writes
    // -------------------------------------------------------------------------

    /// Replace the whole selection. Returns false if the client is not connected.
    pub(crate) fn set_selection(&self, client_id: &ClientId, ids: impl IntoIterator<Item = LayerId>) -> bool {
        let selection = ordered_set(ids);
        self.modify(client_id, |presence| {
            if presence.selection == selection {
                return None;
            }
            presence.selection.clone_from(&selection);
            Some(PresenceEvent::SelectionChanged { client_id: *client_id, selection })
        })
    }

    pub(crate) fn set_cursor(&self, client_id: &ClientId, cursor: Option<Point>) -> bool {
        self.modify(client_id, |presence| {
            if presence.cursor == cursor {
                return None;
            }
            presence.cursor = cursor;
            Some(PresenceEvent::CursorMoved { client_id: *client_id, cursor })
        })
    }

    fn modify<F>(&self, client_id: &ClientId, f: F) -> bool
    where
        F: FnOnce(&mut Presence) -> Option<PresenceEvent>,
    {
        let entries = self.inner.entries.read().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = entries.get(client_id) else {
            return false;
        };
        // Publish under the entry's lock so a client's events keep write order.
        tx.send_if_modified(|presence| match f(presence) {
            Some(event) => {
                self.publish(event);
                true
            }
            None => false,
        });
        true
    }

    fn publish(&self, event: PresenceEvent) {
        if self.inner.events.send(event).is_err() {
            trace!("no presence event subscribers");
        }
    }
}

impl Default for PresenceChannel {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PRESENCE_CAPACITY)
    }
}
