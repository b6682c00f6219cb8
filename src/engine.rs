//! Selection-scoped mutation engine.
//!
//! DESIGN
//! ======
//! The property panels never name a layer: they edit "the selected layer".
//! The engine resolves the acting client's selection from the presence
//! channel, converts the panel's update into a typed patch, and forwards it
//! to the store.
//!
//! - Selection of 0 or 2+ layers is "nothing to edit", not an error.
//! - Hex colors are decoded here; the document never holds hex strings.
//! - `opacity` and `cornerRadius` are clamped to `[0, 100]` even though the
//!   panels already clamp them.
//!
//! ERROR HANDLING
//! ==============
//! A patch whose target vanished (deleted by a peer after selection) is
//! dropped as stale; the next document refresh corrects the UI. A variant
//! mismatch is a bug in the caller: it is logged and returned, and the
//! document is left untouched.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::color::hex_to_rgb;
use crate::document::Revision;
use crate::error::{ErrorCode, MutationError, PatchError};
use crate::layer::LayerId;
use crate::patch::{LayerPatch, LayerUpdate};
use crate::presence::ClientId;
use crate::room::Room;

/// What happened to a selection-scoped update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// The patch was committed (or was empty) at `revision`.
    Applied { layer_id: LayerId, revision: Revision },
    /// Selection did not hold exactly one layer; nothing was written.
    NothingSelected,
    /// The selected layer no longer exists; the update was dropped.
    Stale { layer_id: LayerId },
}

/// Apply a panel update to `client_id`'s single selected layer.
///
/// # Errors
///
/// `Color` for malformed hex input, `Patch(VariantFieldMismatch)` when the
/// update carries a field the selected layer's variant lacks,
/// `Patch(InvalidValue)` for out-of-domain values.
pub fn update_selected_layer(
    room: &Room,
    client_id: ClientId,
    update: LayerUpdate,
) -> Result<UpdateOutcome, MutationError> {
    let Some(layer_id) = room.presence().presence(&client_id).and_then(|p| p.single_selection()) else {
        trace!(%client_id, "update ignored: selection is not a single layer");
        return Ok(UpdateOutcome::NothingSelected);
    };
    let patch = update.into_patch()?;
    commit_patch(room, client_id, layer_id, patch)
}

/// Fill picker: writes the same color to fill and stroke in one patch.
///
/// # Errors
///
/// `Color` for malformed hex input; see [`update_selected_layer`].
pub fn set_fill_and_stroke(room: &Room, client_id: ClientId, hex: &str) -> Result<UpdateOutcome, MutationError> {
    let update = LayerUpdate { fill: Some(hex.to_string()), stroke: Some(hex.to_string()), ..Default::default() };
    update_selected_layer(room, client_id, update)
}

/// Page color picker: decode `hex` and replace the room background.
///
/// # Errors
///
/// `Color` for malformed hex input; nothing is written.
pub fn set_background_hex(room: &Room, client_id: ClientId, hex: &str) -> Result<Revision, MutationError> {
    let color = hex_to_rgb(hex)?;
    Ok(room.store().set_background_from(Some(client_id), color))
}

fn commit_patch(
    room: &Room,
    client_id: ClientId,
    layer_id: LayerId,
    patch: LayerPatch,
) -> Result<UpdateOutcome, MutationError> {
    let fields = patch.fields();
    match room.store().patch_layer_from(Some(client_id), layer_id, patch) {
        Ok(revision) => {
            debug!(%client_id, %layer_id, revision, ?fields, "selected layer updated");
            Ok(UpdateOutcome::Applied { layer_id, revision })
        }
        Err(PatchError::LayerNotFound(_)) => {
            debug!(%client_id, %layer_id, "dropping update for vanished layer");
            Ok(UpdateOutcome::Stale { layer_id })
        }
        Err(e) => {
            warn!(%client_id, %layer_id, code = e.error_code(), error = %e, "layer update rejected");
            Err(e.into())
        }
    }
}
