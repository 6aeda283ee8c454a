//! Typed accessors over the shared store, scoped to one game.
//!
//! Nothing here caches: every call reads or writes the store.

pub mod game_state;
pub mod players;

use serde::de::DeserializeOwned;

pub use game_state::{ChatLogEntry, GameStateRepository};
pub use players::PlayerRepository;

use crate::error::AppError;

/// Decode a stored JSON value; anything unreadable is treated as corruption.
pub(crate) fn decode<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, AppError> {
    serde_json::from_str(json).map_err(|e| AppError::data_corruption(format!("{what}: {e}")))
}
