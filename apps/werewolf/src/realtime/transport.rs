//! Contract with the chat/UI layer that actually talks to players.
//!
//! The core only hands over data; formatting and delivery mechanics belong to
//! the implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub use super::envelope::SystemNotice;
use crate::domain::{
    ChatChannel, GameId, GamePhase, PlayerBoard, PlayerId, RoleName, Team, VotingResult,
};
use crate::error::AppError;

/// One "join" reaction collected during the lobby window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyJoin {
    pub player_id: PlayerId,
    /// Token the player picked to represent them.
    pub avatar: String,
}

impl LobbyJoin {
    pub fn new(player_id: impl Into<PlayerId>, avatar: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            avatar: avatar.into(),
        }
    }
}

/// Inbound action of one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    Chat {
        message: String,
        author_username: String,
    },
    /// A reaction on the option standing for `target_id`. `reactors` is the
    /// number of reactions that option carries, the player's own included.
    Select { target_id: PlayerId, reactors: u32 },
}

/// What a selection prompt is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionKind {
    NightKill,
    NightInspect,
    DayVote,
}

/// Something to show on one player's private surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Delivery {
    RoleAssigned {
        role: RoleName,
    },
    Countdown {
        duration: Duration,
    },
    PhaseChanged {
        phase: GamePhase,
        duration: Duration,
    },
    /// Alive candidates the player may pick from.
    SelectionPrompt {
        kind: SelectionKind,
        candidates: PlayerBoard,
    },
    /// Confirmation of the player's current pick.
    SelectionRecorded {
        kind: SelectionKind,
        target_id: PlayerId,
    },
    /// Remove the affordance of a pick that no longer counts.
    SelectionRevoked {
        kind: SelectionKind,
        target_id: PlayerId,
    },
    RoleRevealed {
        player_id: PlayerId,
        role: RoleName,
    },
    VotingBoard {
        board: PlayerBoard,
        results: Vec<VotingResult>,
    },
    Chat {
        channel: ChatChannel,
        author_id: PlayerId,
        author_username: String,
        message: String,
    },
    Notice {
        notice: SystemNotice,
    },
    /// The player may no longer write or react.
    InputClosed,
    InputOpened,
    GameOver {
        winner: Option<Team>,
    },
}

/// Message for the shared game channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Announcement {
    LobbyOpened { window: Duration },
    InsufficientPlayers { joined: usize, required: usize },
    GameStarted { board: PlayerBoard },
    GameEnded { winner: Option<Team> },
}

#[async_trait]
pub trait PlayerTransport: Send + Sync + 'static {
    /// Joins collected for `game_id` so far, in arrival order. Repeated joins
    /// by the same participant are allowed; the core keeps the first.
    async fn lobby_joins(&self, game_id: &GameId) -> Result<Vec<LobbyJoin>, AppError>;

    /// Route the player's inbound chat and reactions to `events`. Sending
    /// fails once the player's session is gone.
    fn bind_player_input(
        &self,
        game_id: &GameId,
        player_id: &PlayerId,
        events: mpsc::Sender<PlayerEvent>,
    );

    async fn deliver(&self, player_id: &PlayerId, delivery: Delivery) -> Result<(), AppError>;

    async fn announce(&self, game_id: &GameId, announcement: Announcement) -> Result<(), AppError>;
}
