//! Editing core for a shared design document.
//!
//! Several clients edit one document of layers (rectangles, ellipses, paths,
//! text) against a shared background. Each client owns a selection; property
//! panels patch the selected layer, and every committed change is published to
//! all subscribers. Transport, rendering, and persistence live outside this
//! crate: a host wraps a [`room::Room`] per document and hands each connection
//! a [`room::Session`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`color`] | Hex ⇄ RGB conversion and CSS formatting |
//! | [`layer`] | Layer sum type, variants, fonts |
//! | [`patch`] | Sparse updates: UI-facing [`patch::LayerUpdate`] and typed [`patch::LayerPatch`] |
//! | [`document`] | Layer map + z-order + background + revision |
//! | [`store`] | Transactional commits, document subscriptions, change events |
//! | [`presence`] | Per-client selection and cursor, join/leave events |
//! | [`engine`] | Selection-scoped mutations issued by the panels |
//! | [`room`] | Store + presence bundle and per-client sessions |
//! | [`config`] | Room settings from environment variables |
//! | [`replay`] | JSON-lines session scripts for headless runs |
//! | [`error`] | Error enums and the [`error::ErrorCode`] trait |

pub mod color;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod layer;
pub mod patch;
pub mod presence;
pub mod replay;
pub mod room;
pub mod store;
