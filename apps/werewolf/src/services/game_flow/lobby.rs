use time::OffsetDateTime;
use tokio::time::sleep;
use tracing::{info, warn};

use super::GameOrchestrator;
use crate::domain::{assign_roles, GamePhase, Player, PlayerBoard};
use crate::error::AppError;
use crate::realtime::{default_handlers, Announcement, SessionDispatcher};

impl GameOrchestrator {
    /// Run the lobby window, seat the distinct joiners and start one session
    /// per player.
    ///
    /// Fewer joiners than the configured minimum aborts the game with
    /// `InsufficientPlayers` after clearing what the lobby stored.
    pub async fn initialize(&mut self) -> Result<Vec<Player>, AppError> {
        let window = self.config.lobby_countdown;
        self.state.register_open().await?;
        self.state
            .set_creation_timestamp(OffsetDateTime::now_utc())
            .await?;
        self.state.set_phase(GamePhase::Lobby).await?;
        self.transport
            .announce(&self.game_id, Announcement::LobbyOpened { window })
            .await?;
        info!(
            game_id = %self.game_id,
            window_ms = window.as_millis() as u64,
            "Lobby opened"
        );

        sleep(window).await;

        let joins = self.transport.lobby_joins(&self.game_id).await?;
        let players = assign_roles(
            joins.into_iter().map(|j| (j.player_id, j.avatar)),
            &self.config.role_distribution,
        );

        let required = self.config.min_players;
        if players.len() < required {
            warn!(
                game_id = %self.game_id,
                joined = players.len(),
                required,
                "Not enough players, aborting"
            );
            self.transport
                .announce(
                    &self.game_id,
                    Announcement::InsufficientPlayers {
                        joined: players.len(),
                        required,
                    },
                )
                .await?;
            self.state.purge().await?;
            return Err(AppError::InsufficientPlayers {
                joined: players.len(),
                required,
            });
        }

        self.players.set_all(&players).await?;
        for player in &players {
            let handle =
                SessionDispatcher::start(self.session_context(&player.id), default_handlers())
                    .await?;
            self.sessions.push(handle);
        }

        self.transport
            .announce(
                &self.game_id,
                Announcement::GameStarted {
                    board: PlayerBoard::new(&players, None),
                },
            )
            .await?;
        info!(
            game_id = %self.game_id,
            players = players.len(),
            "Game stack initialized"
        );
        Ok(players)
    }
}
