//! Per-player session task.
//!
//! Each session owns a subscription to the game channel and the player's
//! inbound event queue, and hands both to its handlers one message at a time.
//! A player's events are therefore processed strictly in order.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::broker::{ActionStream, GameBroker};
use super::envelope::ActionEnvelope;
use super::transport::{Delivery, PlayerEvent, PlayerTransport};
use crate::domain::{GameId, PlayerId};
use crate::error::AppError;
use crate::repos::{GameStateRepository, PlayerRepository};

const INBOUND_CAPACITY: usize = 32;

/// Everything a handler needs to act for one player.
#[derive(Clone)]
pub struct SessionContext {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub players: PlayerRepository,
    pub state: GameStateRepository,
    pub broker: GameBroker,
    pub transport: Arc<dyn PlayerTransport>,
}

impl SessionContext {
    pub async fn deliver(&self, delivery: Delivery) -> Result<(), AppError> {
        self.transport.deliver(&self.player_id, delivery).await
    }
}

#[async_trait]
pub trait SessionHandler: Send {
    fn name(&self) -> &'static str;

    async fn handle_action(
        &mut self,
        ctx: &SessionContext,
        action: &ActionEnvelope,
    ) -> Result<(), AppError>;

    async fn handle_player_event(
        &mut self,
        ctx: &SessionContext,
        event: &PlayerEvent,
    ) -> Result<(), AppError>;
}

pub struct SessionDispatcher {
    ctx: SessionContext,
    handlers: Vec<Box<dyn SessionHandler>>,
    actions: ActionStream,
    inbound: mpsc::Receiver<PlayerEvent>,
    shutdown: watch::Receiver<bool>,
}

impl SessionDispatcher {
    /// Subscribe, bind the player's input and spawn the session task.
    ///
    /// The subscription is live when this returns.
    pub async fn start(
        ctx: SessionContext,
        handlers: Vec<Box<dyn SessionHandler>>,
    ) -> Result<SessionHandle, AppError> {
        let actions = ctx.broker.subscribe().await?;

        let (events_tx, inbound) = mpsc::channel(INBOUND_CAPACITY);
        ctx.transport
            .bind_player_input(&ctx.game_id, &ctx.player_id, events_tx);

        let (shutdown_tx, shutdown) = watch::channel(false);
        let player_id = ctx.player_id.clone();
        let dispatcher = Self {
            ctx,
            handlers,
            actions,
            inbound,
            shutdown,
        };
        let task = tokio::spawn(dispatcher.run());

        Ok(SessionHandle {
            player_id,
            shutdown: shutdown_tx,
            task: Mutex::new(Some(task)),
        })
    }

    async fn run(mut self) {
        info!(
            game_id = %self.ctx.game_id,
            player_id = %self.ctx.player_id,
            "[SESSION] started"
        );

        let reason = loop {
            tokio::select! {
                biased;

                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break "shutdown";
                    }
                }

                action = self.actions.next() => {
                    let Some(action) = action else {
                        break "channel closed";
                    };
                    let terminal = matches!(action, ActionEnvelope::GameOver(_));
                    self.dispatch_action(&action).await;
                    if terminal {
                        break "game over";
                    }
                }

                Some(event) = self.inbound.recv() => {
                    self.dispatch_event(&event).await;
                }
            }
        };

        self.inbound.close();
        self.actions.unsubscribe();
        info!(
            game_id = %self.ctx.game_id,
            player_id = %self.ctx.player_id,
            reason,
            "[SESSION] stopped"
        );
    }

    async fn dispatch_action(&mut self, action: &ActionEnvelope) {
        for handler in self.handlers.iter_mut() {
            if let Err(err) = handler.handle_action(&self.ctx, action).await {
                warn!(
                    error = %err,
                    code = %err.code(),
                    handler = handler.name(),
                    action = action.name(),
                    player_id = %self.ctx.player_id,
                    "[SESSION] action handling failed"
                );
            }
        }
    }

    async fn dispatch_event(&mut self, event: &PlayerEvent) {
        for handler in self.handlers.iter_mut() {
            if let Err(err) = handler.handle_player_event(&self.ctx, event).await {
                warn!(
                    error = %err,
                    code = %err.code(),
                    handler = handler.name(),
                    player_id = %self.ctx.player_id,
                    "[SESSION] player event handling failed"
                );
            }
        }
    }
}

/// Owner side of a running session.
pub struct SessionHandle {
    player_id: PlayerId,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionHandle {
    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    /// Ask the session to stop. Returns `false` if that was already asked.
    pub fn shutdown(&self) -> bool {
        let requested = self.shutdown.send_if_modified(|down| {
            if *down {
                return false;
            }
            *down = true;
            true
        });
        if !requested {
            debug!(player_id = %self.player_id, "[SESSION] shutdown already requested");
        }
        requested
    }

    pub fn is_finished(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .map_or(true, JoinHandle::is_finished)
    }

    /// Shut down and wait for the task to exit. Later calls return at once.
    ///
    /// A session task that panicked is reported as an internal error.
    pub async fn close(&self) -> Result<(), AppError> {
        self.shutdown();
        let task = self.task.lock().take();
        let Some(task) = task else {
            return Ok(());
        };
        task.await.map_err(|err| {
            AppError::internal(format!(
                "session task for player {} ended abnormally: {err}",
                self.player_id
            ))
        })
    }
}
