//! Realtime side of a game: the channel wire format, per-player sessions and
//! the transport contract they deliver through.

pub mod broker;
pub mod chat;
pub mod dispatcher;
pub mod envelope;
pub mod phase;
pub mod transport;

pub use broker::{ActionStream, GameBroker};
pub use chat::ChatHandler;
pub use dispatcher::{SessionContext, SessionDispatcher, SessionHandle, SessionHandler};
pub use envelope::{ActionEnvelope, SystemNotice};
pub use phase::PhaseHandler;
pub use transport::{
    Announcement, Delivery, LobbyJoin, PlayerEvent, PlayerTransport, SelectionKind,
};

/// Handlers every player session runs, in dispatch order.
pub fn default_handlers() -> Vec<Box<dyn SessionHandler>> {
    vec![Box::new(PhaseHandler::new()), Box::new(ChatHandler::new())]
}
