use serde::{Deserialize, Serialize};

use super::ids::PlayerId;
use super::player::Player;
use super::roles::RoleName;
use super::voting::Voting;

/// One row of the player list handed to the transport for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardEntry {
    pub player_id: PlayerId,
    pub avatar: String,
    pub is_dead: bool,
    /// Revealed for dead players only.
    pub revealed_role: Option<RoleName>,
    /// Present when the board is rendered against a voting ledger.
    pub votes: Option<u32>,
}

/// Seat-ordered player list with live/dead markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerBoard {
    pub entries: Vec<BoardEntry>,
}

impl PlayerBoard {
    pub fn new(players: &[Player], voting: Option<&Voting>) -> Self {
        let mut ordered: Vec<&Player> = players.iter().collect();
        ordered.sort_by_key(|p| p.seat);

        let entries = ordered
            .into_iter()
            .map(|p| BoardEntry {
                player_id: p.id.clone(),
                avatar: p.avatar.clone(),
                is_dead: p.is_dead(),
                revealed_role: p.is_dead().then_some(p.role),
                votes: voting.map(|v| v.vote_count(&p.id)),
            })
            .collect();

        Self { entries }
    }

    pub fn entry(&self, player_id: &PlayerId) -> Option<&BoardEntry> {
        self.entries.iter().find(|e| &e.player_id == player_id)
    }
}
