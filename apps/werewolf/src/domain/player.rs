use serde::{Deserialize, Serialize};

use super::ids::PlayerId;
use super::roles::{Role, RoleName, Team};

/// One participant of a match, as stored in the game's player hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    /// Join order, 0-based. Listings are ordered by seat.
    pub seat: u32,
    /// Opaque token the transport uses to represent the player (e.g. an emoji).
    pub avatar: String,
    pub role: RoleName,
    is_dead: bool,
}

impl Player {
    pub fn new(id: PlayerId, seat: u32, avatar: impl Into<String>, role: RoleName) -> Self {
        Self {
            id,
            seat,
            avatar: avatar.into(),
            role,
            is_dead: false,
        }
    }

    pub fn role(&self) -> &'static Role {
        self.role.role()
    }

    pub fn team(&self) -> Team {
        self.role().team
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    /// Mark the player dead.
    ///
    /// Returns `true` only when this call changed the player; killing a dead
    /// player is a no-op.
    pub fn kill(&mut self) -> bool {
        if self.is_dead {
            return false;
        }
        self.is_dead = true;
        true
    }
}
