use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::domain::DomainError;

/// Overall game progression phases.
///
/// Exactly one phase is stored per game. Play cycles
/// `Night -> DayDiscussion -> DayVoting -> Night` until a terminal condition
/// forces `GameOver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamePhase {
    /// Waiting for joiners; also the value read when nothing is stored.
    #[default]
    Lobby,
    Night,
    DayDiscussion,
    DayVoting,
    GameOver,
}

impl GamePhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            GamePhase::Lobby => "lobby",
            GamePhase::Night => "night",
            GamePhase::DayDiscussion => "day-discussion",
            GamePhase::DayVoting => "day-voting",
            GamePhase::GameOver => "game-over",
        }
    }

    /// Next phase of the cycle. `GameOver` is absorbing.
    pub const fn next(self) -> GamePhase {
        match self {
            GamePhase::Lobby => GamePhase::Night,
            GamePhase::Night => GamePhase::DayDiscussion,
            GamePhase::DayDiscussion => GamePhase::DayVoting,
            GamePhase::DayVoting => GamePhase::Night,
            GamePhase::GameOver => GamePhase::GameOver,
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GamePhase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lobby" => Ok(GamePhase::Lobby),
            "night" => Ok(GamePhase::Night),
            "day-discussion" => Ok(GamePhase::DayDiscussion),
            "day-voting" => Ok(GamePhase::DayVoting),
            "game-over" => Ok(GamePhase::GameOver),
            other => Err(DomainError::validation(format!("unknown game phase '{other}'"))),
        }
    }
}
