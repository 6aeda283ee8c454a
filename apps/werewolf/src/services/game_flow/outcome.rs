use tracing::{debug, info, warn};

use super::{GameOrchestrator, GameOutcome};
use crate::domain::{self, GamePhase, PlayerBoard, WinCheck};
use crate::error::AppError;
use crate::realtime::envelope::GameOverSignal;
use crate::realtime::{ActionEnvelope, Announcement, SystemNotice};

impl GameOrchestrator {
    /// Evaluate the stored population.
    pub async fn check_for_winners(&self) -> Result<WinCheck, AppError> {
        let players = self.players.get_all().await?;
        let check = domain::check_for_winners(&players);
        debug!(game_id = %self.game_id, ?check, "Win check");
        Ok(check)
    }

    /// Publish the end of the match and drop the orchestrator's own
    /// subscription. `GAME_OVER` goes out before anything unsubscribes.
    pub async fn end_game(&mut self, outcome: &GameOutcome) -> Result<(), AppError> {
        self.state.set_phase(GamePhase::GameOver).await?;

        let board = PlayerBoard::new(&self.players.get_all().await?, None);
        self.broker
            .publish(&ActionEnvelope::system(SystemNotice::GameOver {
                winner: outcome.winner,
                board,
            }))
            .await?;
        self.broker
            .publish(&ActionEnvelope::GameOver(GameOverSignal {
                winner: outcome.winner,
            }))
            .await?;
        self.transport
            .announce(
                &self.game_id,
                Announcement::GameEnded {
                    winner: outcome.winner,
                },
            )
            .await?;

        info!(
            game_id = %self.game_id,
            winner = ?outcome.winner,
            rounds = outcome.rounds_played,
            round_limit_reached = outcome.round_limit_reached,
            "Game over"
        );
        self.release_subscription();
        Ok(())
    }

    /// Stop every session and purge the game's state. Safe to call more than
    /// once.
    pub async fn teardown(&mut self) -> Result<(), AppError> {
        for session in &self.sessions {
            if let Err(err) = session.close().await {
                warn!(
                    game_id = %self.game_id,
                    player_id = %session.player_id(),
                    error = %err,
                    code = %err.code(),
                    "Session did not stop cleanly"
                );
            }
        }
        self.release_subscription();
        self.state.purge().await?;
        info!(game_id = %self.game_id, "Game torn down");
        Ok(())
    }
}
