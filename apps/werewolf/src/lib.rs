#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod realtime;
pub mod repos;
pub mod services;
pub mod store;
pub mod telemetry;

// Re-exports for public API
pub use config::GameConfig;
pub use domain::{GameId, GamePhase, Player, PlayerId, RoleName, Team};
pub use error::AppError;
pub use errors::ErrorCode;
pub use realtime::{Announcement, Delivery, LobbyJoin, PlayerEvent, PlayerTransport};
pub use services::{GameOrchestrator, GameOutcome};
pub use store::{MemoryStore, RedisStore, Store};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    werewolf_test_support::logging::init();
}
