//! Game orchestration - the single authoritative driver of one match.
//!
//! The orchestrator owns the phase clock and win evaluation. Everything it
//! decides goes through the store and the game channel; it never talks to
//! sessions directly except to shut them down.

mod lobby;
mod orchestration;
mod outcome;
mod resolution;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::GameConfig;
use crate::domain::{GameId, PlayerId, Team, WinCheck};
use crate::realtime::{ActionStream, GameBroker, PlayerTransport, SessionContext, SessionHandle};
use crate::repos::{GameStateRepository, PlayerRepository};
use crate::store::Store;

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    pub winner: Option<Team>,
    /// Rounds started, the last one included.
    pub rounds_played: u32,
    /// The round cap ended the match before any team won.
    pub round_limit_reached: bool,
}

impl GameOutcome {
    fn decided(check: WinCheck, rounds_played: u32) -> Self {
        Self {
            winner: check.winner(),
            rounds_played,
            round_limit_reached: false,
        }
    }

    fn round_limit(rounds_played: u32) -> Self {
        Self {
            winner: None,
            rounds_played,
            round_limit_reached: true,
        }
    }
}

pub struct GameOrchestrator {
    game_id: GameId,
    config: Arc<GameConfig>,
    transport: Arc<dyn PlayerTransport>,
    players: PlayerRepository,
    state: GameStateRepository,
    broker: GameBroker,
    sessions: Vec<SessionHandle>,
    /// Action streams are not `Sync`; only reached through `get_mut`.
    subscription: Mutex<Option<ActionStream>>,
}

impl GameOrchestrator {
    pub fn new(
        game_id: GameId,
        config: Arc<GameConfig>,
        store: Arc<dyn Store>,
        transport: Arc<dyn PlayerTransport>,
    ) -> Self {
        Self {
            players: PlayerRepository::new(store.clone(), game_id.clone()),
            state: GameStateRepository::new(store.clone(), game_id.clone()),
            broker: GameBroker::new(store, game_id.clone()),
            game_id,
            config,
            transport,
            sessions: Vec::new(),
            subscription: Mutex::new(None),
        }
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn players(&self) -> &PlayerRepository {
        &self.players
    }

    pub fn state(&self) -> &GameStateRepository {
        &self.state
    }

    pub fn sessions(&self) -> &[SessionHandle] {
        &self.sessions
    }

    fn session_context(&self, player_id: &PlayerId) -> SessionContext {
        SessionContext {
            game_id: self.game_id.clone(),
            player_id: player_id.clone(),
            players: self.players.clone(),
            state: self.state.clone(),
            broker: self.broker.clone(),
            transport: self.transport.clone(),
        }
    }

    fn release_subscription(&mut self) {
        if let Some(subscription) = self.subscription.get_mut().take() {
            subscription.unsubscribe();
        }
    }
}
