//! Error codes for the werewolf game engine.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that
//! appear in logs and in announcements to the initiating context.

use core::fmt;

/// Centralized error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Resource Not Found
    /// Player record absent for this game
    PlayerNotFound,
    /// Voting ledger absent
    VotingNotFound,
    /// Role name not present in the role table
    RoleNotFound,

    // Game Lifecycle
    /// Lobby closed with fewer joiners than the configured minimum
    InsufficientPlayers,
    /// Action not allowed for this player right now
    ValidationError,

    // Store & Coordination
    /// Distributed lock retries exhausted
    LockAcquisitionFailed,
    /// Store unreachable (connection refused, reset, timed out)
    StoreUnavailable,
    /// Store rejected a command
    StoreError,
    /// Pub/sub subscription failed or ended
    SubscriptionFailed,

    /// Payload could not be (de)serialized
    SerializationError,
    /// Stored value does not parse
    DataCorruption,
    /// Configuration error
    ConfigError,
    /// Internal error
    InternalError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::VotingNotFound => "VOTING_NOT_FOUND",
            Self::RoleNotFound => "ROLE_NOT_FOUND",

            Self::InsufficientPlayers => "INSUFFICIENT_PLAYERS",
            Self::ValidationError => "VALIDATION_ERROR",

            Self::LockAcquisitionFailed => "LOCK_ACQUISITION_FAILED",
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::StoreError => "STORE_ERROR",
            Self::SubscriptionFailed => "SUBSCRIPTION_FAILED",

            Self::SerializationError => "SERIALIZATION_ERROR",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::ConfigError => "CONFIG_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
