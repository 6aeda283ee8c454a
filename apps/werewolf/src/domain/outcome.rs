use super::player::Player;
use super::roles::Team;

/// Result of evaluating the alive population after a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinCheck {
    /// Both teams still have alive members.
    Continue,
    Winner(Team),
    /// Nobody is left alive.
    NoWinner,
}

impl WinCheck {
    pub fn is_over(self) -> bool {
        !matches!(self, WinCheck::Continue)
    }

    pub fn winner(self) -> Option<Team> {
        match self {
            WinCheck::Winner(team) => Some(team),
            _ => None,
        }
    }
}

/// Partition alive players by team and decide whether the game is over.
pub fn check_for_winners(players: &[Player]) -> WinCheck {
    let alive = players.iter().filter(|p| p.is_alive());
    let (werewolves, villagers) = alive.fold((0usize, 0usize), |(w, v), p| match p.team() {
        Team::Werewolves => (w + 1, v),
        Team::Villagers => (w, v + 1),
    });

    match (werewolves, villagers) {
        (0, 0) => WinCheck::NoWinner,
        (_, 0) => WinCheck::Winner(Team::Werewolves),
        (0, _) => WinCheck::Winner(Team::Villagers),
        _ => WinCheck::Continue,
    }
}
