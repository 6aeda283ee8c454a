//! Chat relay for one player.
//!
//! Outbound lines are logged and published for every session; inbound lines
//! are filtered per observer through [`chat_visibility`].

use async_trait::async_trait;
use tracing::debug;

use super::dispatcher::{SessionContext, SessionHandler};
use super::envelope::{ActionEnvelope, ChatMessage};
use super::transport::{Delivery, PlayerEvent};
use crate::domain::{chat_visibility, GamePhase, Team};
use crate::error::AppError;
use crate::repos::ChatLogEntry;

#[derive(Debug, Default)]
pub struct ChatHandler;

impl ChatHandler {
    pub fn new() -> Self {
        Self
    }

    async fn send(
        &self,
        ctx: &SessionContext,
        message: &str,
        author_username: &str,
    ) -> Result<(), AppError> {
        let author = ctx.players.get_by_id(&ctx.player_id).await?;
        let phase = ctx.state.get_phase().await?;
        if phase == GamePhase::Night && author.is_alive() && author.team() != Team::Werewolves {
            debug!(player_id = %ctx.player_id, "[CHAT] input closed at night");
            return Ok(());
        }

        ctx.state
            .append_chat(&ChatLogEntry::new(author.id.clone(), message))
            .await?;
        ctx.broker
            .publish(&ActionEnvelope::ChatMessageAdded(ChatMessage {
                message: message.to_string(),
                author_id: author.id,
                author_username: author_username.to_string(),
            }))
            .await
    }

    async fn relay(&self, ctx: &SessionContext, chat: &ChatMessage) -> Result<(), AppError> {
        let author = ctx.players.get_by_id(&chat.author_id).await?;
        let observer = ctx.players.get_by_id(&ctx.player_id).await?;
        let phase = ctx.state.get_phase().await?;

        let Some(channel) = chat_visibility(&author, &observer, phase) else {
            return Ok(());
        };
        ctx.deliver(Delivery::Chat {
            channel,
            author_id: chat.author_id.clone(),
            author_username: chat.author_username.clone(),
            message: chat.message.clone(),
        })
        .await
    }
}

#[async_trait]
impl SessionHandler for ChatHandler {
    fn name(&self) -> &'static str {
        "chat"
    }

    async fn handle_action(
        &mut self,
        ctx: &SessionContext,
        action: &ActionEnvelope,
    ) -> Result<(), AppError> {
        match action {
            ActionEnvelope::ChatMessageAdded(chat) => self.relay(ctx, chat).await,
            ActionEnvelope::ChatGlobalSystemMessageAdded(system) => {
                ctx.deliver(Delivery::Notice {
                    notice: system.embed.clone(),
                })
                .await
            }
            _ => Ok(()),
        }
    }

    async fn handle_player_event(
        &mut self,
        ctx: &SessionContext,
        event: &PlayerEvent,
    ) -> Result<(), AppError> {
        match event {
            PlayerEvent::Chat {
                message,
                author_username,
            } => self.send(ctx, message, author_username).await,
            PlayerEvent::Select { .. } => Ok(()),
        }
    }
}
