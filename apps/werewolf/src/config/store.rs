use std::env;

/// Which shared store backs the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    /// Networked Redis instance at `REDIS_URL`.
    Redis,
    /// In-process store; a single process hosts every participant.
    Memory,
}

/// Redis connection URL from the environment (defaults to a local instance).
pub fn redis_url() -> String {
    env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

/// Store backend selected with `WEREWOLF_STORE` (`redis` unless set to `memory`).
pub fn store_kind() -> StoreKind {
    match env::var("WEREWOLF_STORE") {
        Ok(value) if value.eq_ignore_ascii_case("memory") => StoreKind::Memory,
        _ => StoreKind::Redis,
    }
}
