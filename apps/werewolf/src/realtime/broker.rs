use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, error};

use super::envelope::ActionEnvelope;
use crate::domain::GameId;
use crate::error::AppError;
use crate::store::{keys, Store, Subscription};

/// Typed publish/subscribe on one game's channel.
#[derive(Clone)]
pub struct GameBroker {
    store: Arc<dyn Store>,
    game_id: GameId,
    channel: String,
}

impl GameBroker {
    pub fn new(store: Arc<dyn Store>, game_id: GameId) -> Self {
        let channel = keys::channel(&game_id);
        Self {
            store,
            game_id,
            channel,
        }
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub async fn publish(&self, envelope: &ActionEnvelope) -> Result<(), AppError> {
        let encoded = envelope.to_json()?;
        self.store.publish(&self.channel, &encoded).await?;
        debug!(
            game_id = %self.game_id,
            action = envelope.name(),
            "[BROKER] published"
        );
        Ok(())
    }

    pub async fn subscribe(&self) -> Result<ActionStream, AppError> {
        let subscription = self.store.subscribe(&self.channel).await?;
        debug!(game_id = %self.game_id, "[BROKER] subscribed");
        Ok(ActionStream {
            game_id: self.game_id.clone(),
            subscription,
        })
    }
}

/// Decoded envelopes from a game channel.
#[derive(Debug)]
pub struct ActionStream {
    game_id: GameId,
    subscription: Subscription,
}

impl ActionStream {
    /// Next decodable envelope. Payloads that fail to decode are logged and
    /// skipped. `None` once the channel is gone.
    pub async fn next(&mut self) -> Option<ActionEnvelope> {
        loop {
            let started = Instant::now();
            let payload = self.subscription.next().await?;
            match ActionEnvelope::from_json(&payload) {
                Ok(envelope) => return Some(envelope),
                Err(err) => {
                    error!(
                        error = %err,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        game_id = %self.game_id,
                        "Failed to decode game channel payload"
                    );
                }
            }
        }
    }

    pub fn unsubscribe(self) {
        debug!(game_id = %self.game_id, "[BROKER] unsubscribed");
        self.subscription.unsubscribe();
    }
}
