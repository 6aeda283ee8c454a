use serde::{Deserialize, Serialize};

use super::phase::GamePhase;
use super::player::Player;
use super::roles::Team;

/// Channel a relayed chat line is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatChannel {
    /// Whisper between dead players.
    Dead,
    /// Private werewolf talk during the night.
    Werewolf,
    Public,
}

/// Decide whether `observer` sees a line written by `author`.
///
/// `None` means the line is suppressed for this observer. Evaluated per
/// observer and per message against freshly read state.
pub fn chat_visibility(author: &Player, observer: &Player, phase: GamePhase) -> Option<ChatChannel> {
    if author.is_dead() && observer.is_dead() {
        return Some(ChatChannel::Dead);
    }
    if author.is_dead() {
        return None;
    }
    if phase == GamePhase::Night {
        if author.team() == Team::Werewolves && observer.team() == Team::Werewolves {
            return Some(ChatChannel::Werewolf);
        }
        return None;
    }
    Some(ChatChannel::Public)
}
