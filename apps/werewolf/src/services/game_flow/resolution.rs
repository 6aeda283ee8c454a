use tracing::{debug, info, warn};

use super::GameOrchestrator;
use crate::domain::{NightAction, Player, Team, VOTING_DAY_VILLAGE};
use crate::error::AppError;

impl GameOrchestrator {
    /// Apply the werewolves' night picks.
    ///
    /// Each werewolf's first selected target dies once and the werewolf's
    /// selection record is cleared. Returns the players this call killed.
    pub async fn resolve_night_actions(&self) -> Result<Vec<Player>, AppError> {
        let mut players = self.players.get_all().await?;
        let killers: Vec<_> = players
            .iter()
            .filter(|p| {
                p.team() == Team::Werewolves && p.role().night_action == Some(NightAction::Kill)
            })
            .map(|p| p.id.clone())
            .collect();

        let mut killed = Vec::new();
        for killer in killers {
            let targets = self.players.get_selected_targets(&killer).await?;
            if let Some(target_id) = targets.first() {
                match players.iter_mut().find(|p| &p.id == target_id) {
                    Some(target) => {
                        if target.kill() {
                            self.players.set(target).await?;
                            info!(
                                game_id = %self.game_id,
                                killer = %killer,
                                victim = %target.id,
                                "Killed by werewolves"
                            );
                            killed.push(target.clone());
                        } else {
                            debug!(game_id = %self.game_id, victim = %target.id, "Victim already dead");
                        }
                    }
                    None => {
                        warn!(
                            game_id = %self.game_id,
                            killer = %killer,
                            target_id = %target_id,
                            "Night target is not a player of this game"
                        );
                    }
                }
            }
            self.players.delete_selected_targets(&killer).await?;
        }

        Ok(killed)
    }

    /// Execute the village's top-ranked target, if anyone voted, and clear
    /// the ledger either way.
    pub async fn resolve_day_vote(&self) -> Result<Option<Player>, AppError> {
        let results = self
            .state
            .find_voting(VOTING_DAY_VILLAGE)
            .await?
            .map(|voting| voting.results())
            .unwrap_or_default();

        let mut executed = None;
        if let Some(top) = results.first() {
            let mut target = self.players.get_by_id(&top.target_id).await?;
            if target.kill() {
                self.players.set(&target).await?;
                info!(
                    game_id = %self.game_id,
                    victim = %target.id,
                    votes = top.count,
                    "Executed by the village"
                );
                executed = Some(target);
            }
        } else {
            debug!(game_id = %self.game_id, "No votes cast");
        }

        self.state.clear_voting(VOTING_DAY_VILLAGE).await?;
        Ok(executed)
    }
}
