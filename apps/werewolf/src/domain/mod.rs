//! Pure game rules: roles, players, phases, voting and win evaluation.
//!
//! Nothing in here touches the store or the transport, so every rule can be
//! exercised directly from unit and property tests.

pub mod assignment;
pub mod board;
pub mod chat;
pub mod ids;
pub mod outcome;
pub mod phase;
pub mod player;
pub mod roles;
pub mod voting;

pub use assignment::{assign_roles, RoleDistribution};
pub use board::{BoardEntry, PlayerBoard};
pub use chat::{chat_visibility, ChatChannel};
pub use ids::{GameId, PlayerId};
pub use outcome::{check_for_winners, WinCheck};
pub use phase::GamePhase;
pub use player::Player;
pub use roles::{NightAction, Role, RoleName, Team, ROLES};
pub use voting::{VoteChange, Voting, VotingResult, VOTING_DAY_VILLAGE};

#[cfg(test)]
mod tests_outcome;
#[cfg(test)]
mod tests_voting;
