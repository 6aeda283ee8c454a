//! Wire format of the per-game pub/sub channel.
//!
//! Every message is `{"action": "<kebab-name>", "payload": {...}}`. Payload
//! fields are camelCase and durations travel as whole milliseconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{GamePhase, PlayerBoard, PlayerId, Team, Voting};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "kebab-case")]
pub enum ActionEnvelope {
    GamePhaseChanged(PhaseChanged),
    StartGameCountdown(Countdown),
    ChangeVoting(VotingChanged),
    ChatMessageAdded(ChatMessage),
    ChatGlobalSystemMessageAdded(SystemMessage),
    GameOver(GameOverSignal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseChanged {
    pub game_phase: GamePhase,
    #[serde(with = "millis")]
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    #[serde(with = "millis")]
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingChanged {
    pub voting: Voting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub message: String,
    pub author_id: PlayerId,
    pub author_username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMessage {
    pub embed: SystemNotice,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverSignal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Team>,
}

/// Game-wide announcement shown to every player. Rendering is up to the
/// transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SystemNotice {
    #[serde(rename_all = "camelCase")]
    DayStarted {
        killed_by_werewolves: Vec<PlayerId>,
        board: PlayerBoard,
    },
    #[serde(rename_all = "camelCase")]
    VillageVoteResolved {
        executed: Option<PlayerId>,
        board: PlayerBoard,
    },
    #[serde(rename_all = "camelCase")]
    GameOver {
        winner: Option<Team>,
        board: PlayerBoard,
    },
    #[serde(rename_all = "camelCase")]
    RoundLimitReached { rounds: u32 },
}

impl ActionEnvelope {
    pub fn phase_changed(game_phase: GamePhase, duration: Duration) -> Self {
        Self::GamePhaseChanged(PhaseChanged {
            game_phase,
            duration,
        })
    }

    pub fn system(notice: SystemNotice) -> Self {
        Self::ChatGlobalSystemMessageAdded(SystemMessage { embed: notice })
    }

    /// Action name as it appears on the wire.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GamePhaseChanged(_) => "game-phase-changed",
            Self::StartGameCountdown(_) => "start-game-countdown",
            Self::ChangeVoting(_) => "change-voting",
            Self::ChatMessageAdded(_) => "chat-message-added",
            Self::ChatGlobalSystemMessageAdded(_) => "chat-global-system-message-added",
            Self::GameOver(_) => "game-over",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
