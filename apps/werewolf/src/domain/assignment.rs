use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ids::PlayerId;
use super::player::Player;
use super::roles::RoleName;
use crate::errors::domain::DomainError;

/// Roles handed out by join order, cycling through the table.
///
/// The default `[werewolf, seer]` alternates: every second joiner gets the
/// seer, keeping the two teams balanced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDistribution(Vec<RoleName>);

impl RoleDistribution {
    pub fn new(roles: Vec<RoleName>) -> Result<Self, DomainError> {
        if roles.is_empty() {
            return Err(DomainError::validation(
                "role distribution needs at least one role",
            ));
        }
        Ok(Self(roles))
    }

    pub fn role_for_seat(&self, seat: usize) -> RoleName {
        self.0[seat % self.0.len()]
    }

    pub fn roles(&self) -> &[RoleName] {
        &self.0
    }
}

impl Default for RoleDistribution {
    fn default() -> Self {
        Self(vec![RoleName::Werewolf, RoleName::Seer])
    }
}

impl FromStr for RoleDistribution {
    type Err = DomainError;

    /// Comma separated role names, e.g. `werewolf,seer,villager`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let roles = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(RoleName::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(roles)
    }
}

/// Build players from lobby joins, in join order.
///
/// Repeated joins by the same participant keep only the first one; seats are
/// assigned to distinct participants only.
pub fn assign_roles<I>(joins: I, distribution: &RoleDistribution) -> Vec<Player>
where
    I: IntoIterator<Item = (PlayerId, String)>,
{
    let mut players: Vec<Player> = Vec::new();
    for (id, avatar) in joins {
        if players.iter().any(|p| p.id == id) {
            continue;
        }
        let seat = players.len();
        players.push(Player::new(
            id,
            seat as u32,
            avatar,
            distribution.role_for_seat(seat),
        ));
    }
    players
}
