//! Headless session replay.
//!
//! A replay script is JSON lines, one command per line, tagged by `op`:
//!
//! ```text
//! {"op":"connect","client":"alice"}
//! {"op":"insert","client":"alice","label":"box","layer":{"type":"rectangle","x":0,"y":0,"width":10,"height":10,"opacity":100}}
//! {"op":"select","client":"alice","layers":["box"]}
//! {"op":"update","client":"alice","update":{"cornerRadius":20}}
//! {"op":"background","client":"alice","color":"#ffffff"}
//! {"op":"cursor","client":"alice","cursor":{"x":4,"y":2}}
//! {"op":"remove","client":"alice","layer":"box"}
//! {"op":"disconnect","client":"alice"}
//! ```
//!
//! Clients and layers are named by labels; ids are generated on first use and
//! stay stable for the whole run (a reconnecting client keeps its id, a
//! removed layer's label still resolves so stale selections can be scripted).
//! Blank lines and lines starting with `#` are skipped.
//!
//! A line that fails to parse aborts the run. A command that parses but fails
//! to apply is logged with its error code and the run continues.

#[cfg(test)]
#[path = "replay_test.rs"]
mod replay_test;

use std::collections::HashMap;
use std::io::BufRead;

use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::UpdateOutcome;
use crate::error::{ErrorCode, MutationError, PresenceError};
use crate::layer::{Layer, LayerId};
use crate::patch::LayerUpdate;
use crate::presence::{ClientId, Point};
use crate::room::{Room, Session};

// =============================================================================
// SCRIPT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Connect { client: String },
    Disconnect { client: String },
    Insert { client: String, label: String, layer: Layer },
    Select { client: String, layers: Vec<String> },
    Update { client: String, update: LayerUpdate },
    Background { client: String, color: String },
    Cursor { client: String, cursor: Option<Point> },
    Remove { client: String, layer: String },
}

impl Command {
    fn client(&self) -> &str {
        match self {
            Self::Connect { client }
            | Self::Disconnect { client }
            | Self::Insert { client, .. }
            | Self::Select { client, .. }
            | Self::Update { client, .. }
            | Self::Background { client, .. }
            | Self::Cursor { client, .. }
            | Self::Remove { client, .. } => client,
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Failure that aborts a replay run.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl ErrorCode for ReplayError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "E_IO",
            Self::Parse { .. } => "E_SCRIPT_PARSE",
        }
    }
}

/// Failure of a single command; logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("client {0:?} is not connected")]
    UnknownClient(String),
    #[error("unknown layer label {0:?}")]
    UnknownLayer(String),
    #[error(transparent)]
    Presence(#[from] PresenceError),
    #[error(transparent)]
    Mutation(#[from] MutationError),
}

impl ErrorCode for StepError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownClient(_) => "E_UNKNOWN_CLIENT",
            Self::UnknownLayer(_) => "E_UNKNOWN_LAYER",
            Self::Presence(e) => e.error_code(),
            Self::Mutation(e) => e.error_code(),
        }
    }
}

// =============================================================================
// RUNNER
// =============================================================================

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub failed: usize,
    pub skipped: usize,
}

pub struct Replay {
    room: Room,
    client_ids: HashMap<String, ClientId>,
    sessions: HashMap<String, Session>,
    layers: HashMap<String, LayerId>,
}

impl Replay {
    #[must_use]
    pub fn new(room: Room) -> Self {
        Self { room, client_ids: HashMap::new(), sessions: HashMap::new(), layers: HashMap::new() }
    }

    #[must_use]
    pub fn room(&self) -> &Room {
        &self.room
    }

    /// Id assigned to a layer label, if the script inserted it.
    #[must_use]
    pub fn layer_id(&self, label: &str) -> Option<LayerId> {
        self.layers.get(label).copied()
    }

    /// Id assigned to a client label, if the script connected it.
    #[must_use]
    pub fn client_id(&self, label: &str) -> Option<ClientId> {
        self.client_ids.get(label).copied()
    }

    /// Apply every command in `reader`.
    ///
    /// # Errors
    ///
    /// `Io` if reading fails, `Parse` for a line that is not a valid command.
    pub fn run<R: BufRead>(&mut self, reader: R) -> Result<ReplaySummary, ReplayError> {
        let mut summary = ReplaySummary::default();
        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                summary.skipped += 1;
                continue;
            }

            let command: Command =
                serde_json::from_str(trimmed).map_err(|source| ReplayError::Parse { line: line_no, source })?;
            match self.step(command) {
                Ok(()) => summary.applied += 1,
                Err(e) => {
                    warn!(line = line_no, code = e.error_code(), error = %e, "replay command failed");
                    summary.failed += 1;
                }
            }
        }
        info!(
            applied = summary.applied,
            failed = summary.failed,
            revision = self.room.store().revision(),
            "replay complete"
        );
        Ok(summary)
    }

    /// Apply one command.
    ///
    /// # Errors
    ///
    /// Unknown labels, presence lifecycle errors, and rejected mutations.
    pub fn step(&mut self, command: Command) -> Result<(), StepError> {
        if let Command::Connect { client } = &command {
            let id = *self.client_ids.entry(client.clone()).or_insert_with(Uuid::new_v4);
            let session = self.room.connect(id)?;
            self.sessions.insert(client.clone(), session);
            return Ok(());
        }
        if let Command::Disconnect { client } = &command {
            let session = self.sessions.remove(client).ok_or_else(|| StepError::UnknownClient(client.clone()))?;
            session.disconnect();
            return Ok(());
        }

        let session = self
            .sessions
            .get(command.client())
            .ok_or_else(|| StepError::UnknownClient(command.client().to_string()))?;
        match command {
            Command::Insert { label, layer, .. } => {
                let id = session.insert_layer(layer).map_err(MutationError::from)?;
                debug!(%label, %id, "layer inserted");
                self.layers.insert(label, id);
            }
            Command::Select { layers, .. } => {
                let ids = layers
                    .iter()
                    .map(|label| self.layers.get(label).copied().ok_or_else(|| StepError::UnknownLayer(label.clone())))
                    .collect::<Result<Vec<_>, _>>()?;
                session.set_selection(ids)?;
            }
            Command::Update { update, .. } => match session.update_selected_layer(update)? {
                UpdateOutcome::Applied { layer_id, revision } => debug!(%layer_id, revision, "update applied"),
                outcome => info!(?outcome, "update not applied"),
            },
            Command::Background { color, .. } => {
                session.set_background_hex(&color)?;
            }
            Command::Cursor { cursor, .. } => session.set_cursor(cursor)?,
            Command::Remove { layer, .. } => {
                let id = self.layers.get(&layer).copied().ok_or(StepError::UnknownLayer(layer))?;
                session.remove_layer(id).map_err(MutationError::from)?;
            }
            Command::Connect { .. } | Command::Disconnect { .. } => {}
        }
        Ok(())
    }
}
