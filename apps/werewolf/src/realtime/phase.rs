//! Phase-driven prompts and selection capture for one player.

use async_trait::async_trait;
use tracing::{debug, info};

use super::dispatcher::{SessionContext, SessionHandler};
use super::envelope::{ActionEnvelope, PhaseChanged, VotingChanged};
use super::transport::{Delivery, PlayerEvent, SelectionKind};
use crate::domain::{
    GamePhase, NightAction, Player, PlayerBoard, PlayerId, Team, VoteChange, VOTING_DAY_VILLAGE,
};
use crate::error::AppError;

/// Reactions an option needs before a pick on it counts.
const MIN_REACTORS: u32 = 2;

#[derive(Debug, Default)]
pub struct PhaseHandler {
    /// Night pick currently shown as selected to the player.
    night_pick: Option<PlayerId>,
    inspected_tonight: bool,
}

impl PhaseHandler {
    pub fn new() -> Self {
        Self::default()
    }

    async fn on_phase_changed(
        &mut self,
        ctx: &SessionContext,
        change: &PhaseChanged,
    ) -> Result<(), AppError> {
        self.night_pick = None;
        ctx.deliver(Delivery::PhaseChanged {
            phase: change.game_phase,
            duration: change.duration,
        })
        .await?;

        let me = ctx.players.get_by_id(&ctx.player_id).await?;
        if me.is_dead() {
            return Ok(());
        }

        match change.game_phase {
            GamePhase::Night => {
                self.inspected_tonight = false;
                if me.team() != Team::Werewolves {
                    ctx.deliver(Delivery::InputClosed).await?;
                }
                let kind = match me.role().night_action {
                    Some(NightAction::Kill) => SelectionKind::NightKill,
                    Some(NightAction::Inspect) => SelectionKind::NightInspect,
                    None => return Ok(()),
                };
                self.prompt(ctx, &me, kind).await
            }
            GamePhase::DayDiscussion => {
                if me.team() != Team::Werewolves {
                    ctx.deliver(Delivery::InputOpened).await?;
                }
                Ok(())
            }
            GamePhase::DayVoting => self.prompt(ctx, &me, SelectionKind::DayVote).await,
            GamePhase::Lobby | GamePhase::GameOver => Ok(()),
        }
    }

    async fn prompt(
        &self,
        ctx: &SessionContext,
        me: &Player,
        kind: SelectionKind,
    ) -> Result<(), AppError> {
        let mut candidates = ctx.players.get_alive().await?;
        candidates.retain(|p| p.id != me.id);
        ctx.deliver(Delivery::SelectionPrompt {
            kind,
            candidates: PlayerBoard::new(&candidates, None),
        })
        .await
    }

    async fn on_select(
        &mut self,
        ctx: &SessionContext,
        target_id: &PlayerId,
        reactors: u32,
    ) -> Result<(), AppError> {
        if reactors < MIN_REACTORS {
            debug!(player_id = %ctx.player_id, reactors, "[PHASE] reaction below threshold");
            return Ok(());
        }

        let me = ctx.players.get_by_id(&ctx.player_id).await?;
        if me.is_dead() {
            debug!(player_id = %ctx.player_id, "[PHASE] dead player cannot act");
            return Ok(());
        }
        let Some(target) = ctx.players.find_by_id(target_id).await? else {
            debug!(player_id = %ctx.player_id, target_id = %target_id, "[PHASE] unknown target");
            return Ok(());
        };
        if target.is_dead() || target.id == me.id {
            debug!(player_id = %ctx.player_id, target_id = %target_id, "[PHASE] target not eligible");
            return Ok(());
        }

        match ctx.state.selection_window().await? {
            Some(GamePhase::Night) => match me.role().night_action {
                Some(NightAction::Kill) => self.pick_victim(ctx, &target).await,
                Some(NightAction::Inspect) => self.inspect(ctx, &target).await,
                None => Ok(()),
            },
            Some(GamePhase::DayVoting) => self.vote(ctx, &me, &target).await,
            window => {
                debug!(player_id = %ctx.player_id, ?window, "[PHASE] selections closed");
                Ok(())
            }
        }
    }

    /// Keep exactly one night pick per player; a new pick replaces the old.
    async fn pick_victim(&mut self, ctx: &SessionContext, target: &Player) -> Result<(), AppError> {
        if self.night_pick.as_ref() == Some(&target.id) {
            return Ok(());
        }

        let recorded = ctx
            .state
            .within_selection_window(GamePhase::Night, || {
                ctx.players
                    .set_selected_targets(&ctx.player_id, std::slice::from_ref(&target.id))
            })
            .await?;
        if recorded.is_none() {
            debug!(player_id = %ctx.player_id, "[PHASE] night closed before the pick landed");
            return Ok(());
        }

        if let Some(previous) = self.night_pick.replace(target.id.clone()) {
            ctx.deliver(Delivery::SelectionRevoked {
                kind: SelectionKind::NightKill,
                target_id: previous,
            })
            .await?;
        }
        info!(
            game_id = %ctx.game_id,
            player_id = %ctx.player_id,
            target_id = %target.id,
            "[PHASE] night target selected"
        );
        ctx.deliver(Delivery::SelectionRecorded {
            kind: SelectionKind::NightKill,
            target_id: target.id.clone(),
        })
        .await
    }

    async fn inspect(&mut self, ctx: &SessionContext, target: &Player) -> Result<(), AppError> {
        if self.inspected_tonight {
            debug!(player_id = %ctx.player_id, "[PHASE] already inspected tonight");
            return Ok(());
        }
        self.inspected_tonight = true;
        ctx.deliver(Delivery::RoleRevealed {
            player_id: target.id.clone(),
            role: target.role,
        })
        .await
    }

    async fn vote(
        &self,
        ctx: &SessionContext,
        me: &Player,
        target: &Player,
    ) -> Result<(), AppError> {
        let cast = ctx
            .state
            .within_selection_window(GamePhase::DayVoting, || {
                ctx.state
                    .update_voting(VOTING_DAY_VILLAGE, |v| v.set_vote(&me.id, &target.id))
            })
            .await?;
        let Some((voting, change)) = cast else {
            debug!(player_id = %ctx.player_id, "[PHASE] voting closed before the vote landed");
            return Ok(());
        };

        let withdrawn = change == VoteChange::Withdrawn;
        match change {
            VoteChange::Cast => {}
            VoteChange::Changed { previous } => {
                ctx.deliver(Delivery::SelectionRevoked {
                    kind: SelectionKind::DayVote,
                    target_id: previous,
                })
                .await?;
            }
            VoteChange::Withdrawn => {
                ctx.deliver(Delivery::SelectionRevoked {
                    kind: SelectionKind::DayVote,
                    target_id: target.id.clone(),
                })
                .await?;
            }
        }
        if !withdrawn {
            ctx.deliver(Delivery::SelectionRecorded {
                kind: SelectionKind::DayVote,
                target_id: target.id.clone(),
            })
            .await?;
        }

        ctx.broker
            .publish(&ActionEnvelope::ChangeVoting(VotingChanged { voting }))
            .await
    }

    async fn on_voting_changed(
        &self,
        ctx: &SessionContext,
        change: &VotingChanged,
    ) -> Result<(), AppError> {
        let players = ctx.players.get_all().await?;
        ctx.deliver(Delivery::VotingBoard {
            board: PlayerBoard::new(&players, Some(&change.voting)),
            results: change.voting.results(),
        })
        .await
    }
}

#[async_trait]
impl SessionHandler for PhaseHandler {
    fn name(&self) -> &'static str {
        "phase"
    }

    async fn handle_action(
        &mut self,
        ctx: &SessionContext,
        action: &ActionEnvelope,
    ) -> Result<(), AppError> {
        match action {
            ActionEnvelope::GamePhaseChanged(change) => self.on_phase_changed(ctx, change).await,
            ActionEnvelope::StartGameCountdown(countdown) => {
                let me = ctx.players.get_by_id(&ctx.player_id).await?;
                ctx.deliver(Delivery::RoleAssigned { role: me.role }).await?;
                ctx.deliver(Delivery::Countdown {
                    duration: countdown.duration,
                })
                .await
            }
            ActionEnvelope::ChangeVoting(change) => self.on_voting_changed(ctx, change).await,
            ActionEnvelope::GameOver(signal) => {
                ctx.deliver(Delivery::InputClosed).await?;
                ctx.deliver(Delivery::GameOver {
                    winner: signal.winner,
                })
                .await
            }
            ActionEnvelope::ChatMessageAdded(_)
            | ActionEnvelope::ChatGlobalSystemMessageAdded(_) => Ok(()),
        }
    }

    async fn handle_player_event(
        &mut self,
        ctx: &SessionContext,
        event: &PlayerEvent,
    ) -> Result<(), AppError> {
        match event {
            PlayerEvent::Select {
                target_id,
                reactors,
            } => self.on_select(ctx, target_id, *reactors).await,
            PlayerEvent::Chat { .. } => Ok(()),
        }
    }
}
