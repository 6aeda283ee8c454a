use std::time::Duration;

use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, error, info, warn};

use super::{GameOrchestrator, GameOutcome};
use crate::domain::{GamePhase, PlayerBoard};
use crate::error::AppError;
use crate::realtime::envelope::Countdown;
use crate::realtime::{ActionEnvelope, SystemNotice};

impl GameOrchestrator {
    /// Drive the whole match: lobby, rounds, game over, linger and teardown.
    ///
    /// Teardown also runs when any step fails; the first error is returned.
    pub async fn run(&mut self) -> Result<GameOutcome, AppError> {
        let result = async {
            self.initialize().await?;
            self.start_game().await
        }
        .await;

        match result {
            Ok(outcome) => {
                sleep(self.config.game_over_linger).await;
                self.teardown().await?;
                Ok(outcome)
            }
            Err(err) => {
                error!(
                    game_id = %self.game_id,
                    error = %err,
                    code = %err.code(),
                    "Game aborted"
                );
                if let Err(teardown_err) = self.teardown().await {
                    warn!(
                        game_id = %self.game_id,
                        error = %teardown_err,
                        "Teardown after abort failed"
                    );
                }
                Err(err)
            }
        }
    }

    /// Count down, play rounds until a team wins or the round cap is hit, and
    /// publish the end of the game.
    ///
    /// An existing channel subscription is dropped and replaced first, so
    /// calling this again never leaves two subscriptions behind.
    pub async fn start_game(&mut self) -> Result<GameOutcome, AppError> {
        self.release_subscription();
        let subscription = self.broker.subscribe().await?;
        *self.subscription.get_mut() = Some(subscription);

        let countdown = self.config.start_countdown;
        self.broker
            .publish(&ActionEnvelope::StartGameCountdown(Countdown {
                duration: countdown,
            }))
            .await?;
        info!(
            game_id = %self.game_id,
            countdown_ms = countdown.as_millis() as u64,
            "Game starting"
        );
        self.wait(countdown).await;

        let outcome = self.play_rounds().await?;
        self.end_game(&outcome).await?;
        Ok(outcome)
    }

    async fn play_rounds(&mut self) -> Result<GameOutcome, AppError> {
        let max_rounds = self.config.max_rounds;

        for round in 1..=max_rounds {
            debug!(game_id = %self.game_id, round, "Round started");

            self.enter_phase(GamePhase::Night, self.config.night).await?;
            self.wait(self.config.night).await;
            self.state.close_selections().await?;
            if let Some(outcome) = self.finished(round).await? {
                return Ok(outcome);
            }

            let killed = self.resolve_night_actions().await?;
            self.enter_phase(GamePhase::DayDiscussion, self.config.day_discussion)
                .await?;
            let board = PlayerBoard::new(&self.players.get_all().await?, None);
            self.broker
                .publish(&ActionEnvelope::system(SystemNotice::DayStarted {
                    killed_by_werewolves: killed.into_iter().map(|p| p.id).collect(),
                    board,
                }))
                .await?;
            if let Some(outcome) = self.finished(round).await? {
                return Ok(outcome);
            }
            self.wait(self.config.day_discussion).await;
            if let Some(outcome) = self.finished(round).await? {
                return Ok(outcome);
            }

            self.enter_phase(GamePhase::DayVoting, self.config.day_voting)
                .await?;
            self.wait(self.config.day_voting).await;
            self.state.close_selections().await?;
            let executed = self.resolve_day_vote().await?;
            let board = PlayerBoard::new(&self.players.get_all().await?, None);
            self.broker
                .publish(&ActionEnvelope::system(SystemNotice::VillageVoteResolved {
                    executed: executed.map(|p| p.id),
                    board,
                }))
                .await?;
            if let Some(outcome) = self.finished(round).await? {
                return Ok(outcome);
            }
        }

        warn!(
            game_id = %self.game_id,
            max_rounds,
            "Round limit reached without a winner"
        );
        self.broker
            .publish(&ActionEnvelope::system(SystemNotice::RoundLimitReached {
                rounds: max_rounds,
            }))
            .await?;
        Ok(GameOutcome::round_limit(max_rounds))
    }

    /// Store the phase, open its selections if it takes any, then announce
    /// it on the channel.
    async fn enter_phase(&self, phase: GamePhase, duration: Duration) -> Result<(), AppError> {
        self.state.set_phase(phase).await?;
        if matches!(phase, GamePhase::Night | GamePhase::DayVoting) {
            self.state.open_selections(phase).await?;
        }
        self.broker
            .publish(&ActionEnvelope::phase_changed(phase, duration))
            .await?;
        info!(
            game_id = %self.game_id,
            %phase,
            duration_ms = duration.as_millis() as u64,
            "Phase entered"
        );
        Ok(())
    }

    async fn finished(&self, round: u32) -> Result<Option<GameOutcome>, AppError> {
        let check = self.check_for_winners().await?;
        Ok(check
            .is_over()
            .then(|| GameOutcome::decided(check, round)))
    }

    /// Passive wait that keeps draining the game channel.
    async fn wait(&mut self, duration: Duration) {
        let deadline = sleep_until(Instant::now() + duration);
        tokio::pin!(deadline);

        loop {
            let Some(stream) = self.subscription.get_mut().as_mut() else {
                deadline.await;
                return;
            };
            tokio::select! {
                _ = &mut deadline => return,
                action = stream.next() => match action {
                    Some(action) => {
                        debug!(game_id = %self.game_id, action = action.name(), "Observed action");
                    }
                    None => {
                        warn!(game_id = %self.game_id, "Game channel closed while waiting");
                        *self.subscription.get_mut() = None;
                    }
                },
            }
        }
    }
}
