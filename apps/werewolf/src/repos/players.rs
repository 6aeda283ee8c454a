//! Player records and per-actor selection scratch state of one game.

use std::sync::Arc;

use tracing::debug;

use super::decode;
use crate::domain::{GameId, Player, PlayerId};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::store::{keys, Store};

#[derive(Clone)]
pub struct PlayerRepository {
    store: Arc<dyn Store>,
    game_id: GameId,
}

impl PlayerRepository {
    pub fn new(store: Arc<dyn Store>, game_id: GameId) -> Self {
        Self { store, game_id }
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    /// Every player of the game, ordered by seat.
    pub async fn get_all(&self) -> Result<Vec<Player>, AppError> {
        let raw = self.store.hgetall(&keys::players(&self.game_id)).await?;
        let mut players = raw
            .values()
            .map(|json| decode::<Player>(json, "player record"))
            .collect::<Result<Vec<_>, _>>()?;
        players.sort_by_key(|p| p.seat);
        Ok(players)
    }

    pub async fn get_alive(&self) -> Result<Vec<Player>, AppError> {
        let mut players = self.get_all().await?;
        players.retain(Player::is_alive);
        Ok(players)
    }

    pub async fn find_by_id(&self, player_id: &PlayerId) -> Result<Option<Player>, AppError> {
        self.store
            .hget(&keys::players(&self.game_id), player_id.as_str())
            .await?
            .map(|json| decode(&json, "player record"))
            .transpose()
    }

    /// Like [`find_by_id`](Self::find_by_id) but absence is an error.
    pub async fn get_by_id(&self, player_id: &PlayerId) -> Result<Player, AppError> {
        self.find_by_id(player_id).await?.ok_or_else(|| {
            AppError::not_found(
                ErrorCode::PlayerNotFound,
                format!("Player {player_id} not found in game {}", self.game_id),
            )
        })
    }

    /// Replace the stored record of `player`.
    pub async fn set(&self, player: &Player) -> Result<(), AppError> {
        let json = serde_json::to_string(player)?;
        self.store
            .hset(&keys::players(&self.game_id), player.id.as_str(), &json)
            .await
    }

    pub async fn set_all(&self, players: &[Player]) -> Result<(), AppError> {
        for player in players {
            self.set(player).await?;
        }
        debug!(game_id = %self.game_id, count = players.len(), "Stored players");
        Ok(())
    }

    pub async fn del(&self, player_id: &PlayerId) -> Result<bool, AppError> {
        self.store
            .hdel(&keys::players(&self.game_id), player_id.as_str())
            .await
    }

    pub async fn count(&self) -> Result<usize, AppError> {
        self.store.hlen(&keys::players(&self.game_id)).await
    }

    pub async fn set_selected_targets(
        &self,
        actor_id: &PlayerId,
        targets: &[PlayerId],
    ) -> Result<(), AppError> {
        let json = serde_json::to_string(targets)?;
        self.store
            .set(&keys::selected_player_ids(&self.game_id, actor_id), &json)
            .await
    }

    /// Empty when the actor selected nothing.
    pub async fn get_selected_targets(&self, actor_id: &PlayerId) -> Result<Vec<PlayerId>, AppError> {
        match self
            .store
            .get(&keys::selected_player_ids(&self.game_id, actor_id))
            .await?
        {
            Some(json) => decode(&json, "selection record"),
            None => Ok(Vec::new()),
        }
    }

    pub async fn delete_selected_targets(&self, actor_id: &PlayerId) -> Result<(), AppError> {
        self.store
            .del(&keys::selected_player_ids(&self.game_id, actor_id))
            .await?;
        Ok(())
    }
}
