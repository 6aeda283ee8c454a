//! Per-game scalar state: phase, creation time, chat log and voting ledgers.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::decode;
use crate::domain::{GameId, GamePhase, PlayerId, Voting};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::store::{keys, DistributedLock, LockGuard, Store};

/// One line of a game's chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatLogEntry {
    pub id: Uuid,
    pub author_id: PlayerId,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
}

impl ChatLogEntry {
    pub fn new(author_id: PlayerId, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            message: message.into(),
            sent_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Clone)]
pub struct GameStateRepository {
    store: Arc<dyn Store>,
    lock: DistributedLock,
    game_id: GameId,
}

impl GameStateRepository {
    pub fn new(store: Arc<dyn Store>, game_id: GameId) -> Self {
        let lock = DistributedLock::new(store.clone());
        Self::with_lock(store, lock, game_id)
    }

    pub fn with_lock(store: Arc<dyn Store>, lock: DistributedLock, game_id: GameId) -> Self {
        Self {
            store,
            lock,
            game_id,
        }
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    /// Ids of every game registered as open.
    pub async fn open_games(store: &dyn Store) -> Result<Vec<GameId>, AppError> {
        Ok(store
            .smembers(keys::OPEN_GAMES)
            .await?
            .into_iter()
            .map(GameId::from)
            .collect())
    }

    pub async fn register_open(&self) -> Result<(), AppError> {
        self.store
            .sadd(keys::OPEN_GAMES, self.game_id.as_str())
            .await
    }

    pub async fn remove_open(&self) -> Result<(), AppError> {
        self.store
            .srem(keys::OPEN_GAMES, self.game_id.as_str())
            .await
    }

    pub async fn set_creation_timestamp(&self, at: OffsetDateTime) -> Result<(), AppError> {
        let millis = at.unix_timestamp_nanos() / 1_000_000;
        self.store
            .set(&keys::creation_timestamp(&self.game_id), &millis.to_string())
            .await
    }

    pub async fn creation_timestamp(&self) -> Result<Option<OffsetDateTime>, AppError> {
        let Some(raw) = self
            .store
            .get(&keys::creation_timestamp(&self.game_id))
            .await?
        else {
            return Ok(None);
        };
        let millis: i128 = raw.parse().map_err(|_| {
            AppError::data_corruption(format!("creation timestamp '{raw}' is not a number"))
        })?;
        OffsetDateTime::from_unix_timestamp_nanos(millis * 1_000_000)
            .map(Some)
            .map_err(|e| AppError::data_corruption(format!("creation timestamp out of range: {e}")))
    }

    /// Current phase; a game with no stored phase is in the lobby.
    pub async fn get_phase(&self) -> Result<GamePhase, AppError> {
        match self.store.get(&keys::phase(&self.game_id)).await? {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::data_corruption(format!("stored phase: {e}"))),
            None => Ok(GamePhase::default()),
        }
    }

    pub async fn set_phase(&self, phase: GamePhase) -> Result<(), AppError> {
        self.store
            .set(&keys::phase(&self.game_id), phase.as_str())
            .await
    }

    /// Phase whose selections are accepted right now, `None` while closed.
    pub async fn selection_window(&self) -> Result<Option<GamePhase>, AppError> {
        match self.store.get(&keys::selection_window(&self.game_id)).await? {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|e| AppError::data_corruption(format!("stored selection window: {e}"))),
            None => Ok(None),
        }
    }

    /// Start accepting night picks or day votes made for `phase`.
    pub async fn open_selections(&self, phase: GamePhase) -> Result<(), AppError> {
        self.store
            .set(&keys::selection_window(&self.game_id), phase.as_str())
            .await
    }

    /// Stop accepting selections.
    ///
    /// Taken under the window lock: once this returns, every selection
    /// admitted before it has finished writing and none can start.
    pub async fn close_selections(&self) -> Result<(), AppError> {
        let key = keys::selection_window(&self.game_id);
        let mut guard = self.lock.acquire(&key).await?;
        let result = self.store.del(&key).await.map(|_| ());
        release_quietly(&mut guard).await;
        debug!(game_id = %self.game_id, "Selections closed");
        result
    }

    /// Run `write` while holding the window lock, but only if the window is
    /// open for `phase`. Returns `None` without writing otherwise.
    pub async fn within_selection_window<T, F, Fut>(
        &self,
        phase: GamePhase,
        write: F,
    ) -> Result<Option<T>, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let key = keys::selection_window(&self.game_id);
        let mut guard = self.lock.acquire(&key).await?;

        let result: Result<Option<T>, AppError> = async {
            if self.selection_window().await? != Some(phase) {
                return Ok(None);
            }
            write().await.map(Some)
        }
        .await;

        release_quietly(&mut guard).await;
        result
    }

    pub async fn append_chat(&self, entry: &ChatLogEntry) -> Result<(), AppError> {
        let json = serde_json::to_string(entry)?;
        let score = (entry.sent_at.unix_timestamp_nanos() / 1_000_000) as i64;
        self.store
            .zadd(&keys::chat(&self.game_id), score, &json)
            .await
    }

    /// Chat history, oldest first.
    pub async fn chat_log(&self) -> Result<Vec<ChatLogEntry>, AppError> {
        self.store
            .zrange(&keys::chat(&self.game_id))
            .await?
            .iter()
            .map(|json| decode(json, "chat entry"))
            .collect()
    }

    pub async fn find_voting(&self, voting_id: &str) -> Result<Option<Voting>, AppError> {
        self.store
            .get(&keys::voting(&self.game_id, voting_id))
            .await?
            .map(|json| decode(&json, "voting ledger"))
            .transpose()
    }

    pub async fn get_voting(&self, voting_id: &str) -> Result<Voting, AppError> {
        self.find_voting(voting_id).await?.ok_or_else(|| {
            AppError::not_found(
                ErrorCode::VotingNotFound,
                format!("Voting {voting_id} not found in game {}", self.game_id),
            )
        })
    }

    pub async fn set_voting(&self, voting: &Voting) -> Result<(), AppError> {
        let json = voting.to_json()?;
        self.store
            .set(&keys::voting(&self.game_id, voting.id()), &json)
            .await
    }

    pub async fn clear_voting(&self, voting_id: &str) -> Result<(), AppError> {
        self.store
            .del(&keys::voting(&self.game_id, voting_id))
            .await?;
        Ok(())
    }

    /// Locked read-modify-write of one ledger. A missing ledger starts empty.
    ///
    /// Returns the ledger as written together with whatever `apply` returned.
    pub async fn update_voting<R>(
        &self,
        voting_id: &str,
        apply: impl FnOnce(&mut Voting) -> R,
    ) -> Result<(Voting, R), AppError> {
        let key = keys::voting(&self.game_id, voting_id);
        let mut guard = self.lock.acquire(&key).await?;

        let result = async {
            let mut voting = self
                .find_voting(voting_id)
                .await?
                .unwrap_or_else(|| Voting::new(voting_id));
            let outcome = apply(&mut voting);
            self.set_voting(&voting).await?;
            Ok::<_, AppError>((voting, outcome))
        }
        .await;

        release_quietly(&mut guard).await;
        result
    }

    /// Delete every key of the game and drop it from the open-games index.
    pub async fn purge(&self) -> Result<usize, AppError> {
        let game_keys = self
            .store
            .keys_with_prefix(&keys::game_prefix(&self.game_id))
            .await?;
        for key in &game_keys {
            self.store.del(key).await?;
        }
        self.remove_open().await?;
        info!(game_id = %self.game_id, removed = game_keys.len(), "Purged game state");
        debug!(game_id = %self.game_id, keys = ?game_keys, "Purged keys");
        Ok(game_keys.len())
    }
}

async fn release_quietly(guard: &mut LockGuard) {
    if let Err(err) = guard.release().await {
        warn!(error = %err, key = %guard.key(), "Failed to release lock");
    }
}
