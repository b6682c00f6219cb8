//! Error taxonomy for the editing core.
//!
//! DESIGN
//! ======
//! Each concern owns its own `thiserror` enum (`ColorError`, `PatchError`,
//! `PresenceError`, `ConfigError`). `MutationError` is the union returned by
//! the selection-scoped engine. Every error exposes a grepable code through
//! `ErrorCode` so the UI layer can map failures to validation messages
//! without string matching.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here is fatal. A bad mutation from one client is rejected before
//! any write, so the shared document is never left half-patched.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::color::ColorError;
use crate::layer::LayerId;

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code and retryable flag for structured error reporting.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// PATCH
// =============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatchError {
    #[error("layer not found: {0}")]
    LayerNotFound(LayerId),
    #[error("field `{field}` is not valid for {kind} layers")]
    VariantFieldMismatch { field: &'static str, kind: &'static str },
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ErrorCode for PatchError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::LayerNotFound(_) => "E_LAYER_NOT_FOUND",
            Self::VariantFieldMismatch { .. } => "E_VARIANT_FIELD_MISMATCH",
            Self::InvalidValue { .. } => "E_INVALID_VALUE",
        }
    }

    fn retryable(&self) -> bool {
        // The next subscription refresh may bring the layer back into view.
        matches!(self, Self::LayerNotFound(_))
    }
}

// =============================================================================
// PRESENCE
// =============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PresenceError {
    #[error("client already connected: {0}")]
    AlreadyConnected(crate::presence::ClientId),
    #[error("client not connected: {0}")]
    NotConnected(crate::presence::ClientId),
}

impl ErrorCode for PresenceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyConnected(_) => "E_ALREADY_CONNECTED",
            Self::NotConnected(_) => "E_NOT_CONNECTED",
        }
    }
}

// =============================================================================
// MUTATION
// =============================================================================

/// Failure of a UI-issued mutation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MutationError {
    #[error(transparent)]
    Color(#[from] ColorError),
    #[error(transparent)]
    Patch(#[from] PatchError),
}

impl ErrorCode for MutationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Color(e) => e.error_code(),
            Self::Patch(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Color(e) => e.retryable(),
            Self::Patch(e) => e.retryable(),
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {source}")]
    InvalidColor {
        var: &'static str,
        #[source]
        source: ColorError,
    },
    #[error("invalid {var}: expected a positive integer, got {value:?}")]
    InvalidCapacity { var: &'static str, value: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        "E_CONFIG"
    }
}
