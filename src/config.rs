//! Room configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::color::{Rgb, hex_to_rgb};
use crate::document::DEFAULT_BACKGROUND;
use crate::error::ConfigError;

pub const DEFAULT_EVENT_CAPACITY: usize = 256;
pub const DEFAULT_PRESENCE_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomConfig {
    /// Background color of a new room's document.
    pub background: Rgb,
    /// Document events a subscriber may lag behind before losing the oldest.
    pub event_capacity: usize,
    /// Presence events a subscriber may lag behind before losing the oldest.
    pub presence_capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            presence_capacity: DEFAULT_PRESENCE_CAPACITY,
        }
    }
}

impl RoomConfig {
    /// Build typed room config from environment variables.
    ///
    /// Optional:
    /// - `ROOM_BACKGROUND`: hex color, default `#1e1e1e`
    /// - `ROOM_EVENT_CAPACITY`: default 256
    /// - `PRESENCE_EVENT_CAPACITY`: default 256
    ///
    /// # Errors
    ///
    /// `InvalidColor` for a malformed background, `InvalidCapacity` for a
    /// capacity that is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        let background = match std::env::var("ROOM_BACKGROUND") {
            Ok(raw) => {
                hex_to_rgb(raw.trim()).map_err(|source| ConfigError::InvalidColor { var: "ROOM_BACKGROUND", source })?
            }
            Err(_) => DEFAULT_BACKGROUND,
        };

        Ok(Self {
            background,
            event_capacity: env_capacity("ROOM_EVENT_CAPACITY", DEFAULT_EVENT_CAPACITY)?,
            presence_capacity: env_capacity("PRESENCE_EVENT_CAPACITY", DEFAULT_PRESENCE_CAPACITY)?,
        })
    }
}

fn env_capacity(var: &'static str, default: usize) -> Result<usize, ConfigError> {
    let Ok(raw) = std::env::var(var) else {
        return Ok(default);
    };
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidCapacity { var, value: raw }),
    }
}
