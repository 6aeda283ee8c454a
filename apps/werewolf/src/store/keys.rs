//! Key namespace shared by every process attached to the store.

use crate::domain::{GameId, PlayerId};

/// Set of game ids currently accepting or playing.
pub const OPEN_GAMES: &str = "d-games-open";

/// Prefix under which every key of one game lives.
pub fn game_prefix(game_id: &GameId) -> String {
    format!("d-game:{game_id}:")
}

pub fn creation_timestamp(game_id: &GameId) -> String {
    format!("d-game:{game_id}:creation-timestamp")
}

pub fn phase(game_id: &GameId) -> String {
    format!("d-game:{game_id}:phase")
}

/// Hash of player id to serialized player.
pub fn players(game_id: &GameId) -> String {
    format!("d-game:{game_id}:players")
}

/// Sorted set of chat entries scored by timestamp.
pub fn chat(game_id: &GameId) -> String {
    format!("d-game:{game_id}:chat")
}

pub fn voting(game_id: &GameId, voting_id: &str) -> String {
    format!("d-game:{game_id}:voting:{voting_id}")
}

/// Phase whose selections are currently accepted; absent while closed.
pub fn selection_window(game_id: &GameId) -> String {
    format!("d-game:{game_id}:selection-window")
}

pub fn selected_player_ids(game_id: &GameId, actor_id: &PlayerId) -> String {
    format!("d-game:{game_id}:selected-player-ids:{actor_id}")
}

/// Pub/sub channel of one game.
pub fn channel(game_id: &GameId) -> String {
    format!("d-game:{game_id}")
}

pub fn lock(resource: &str) -> String {
    format!("{resource}:lock")
}
