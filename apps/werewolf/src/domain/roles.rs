//! Static role table.
//!
//! Roles never change at runtime. Each descriptor is a `'static` value and the
//! name lookup table is built once per process; players only store the
//! [`RoleName`] and borrow the descriptor when needed.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Team {
    Werewolves,
    Villagers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    Werewolf,
    Seer,
    Villager,
}

/// What a role may do while the village sleeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NightAction {
    /// Choose a victim; resolved when the day starts.
    Kill,
    /// Learn the role of one player, immediately.
    Inspect,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Role {
    pub name: RoleName,
    pub title: &'static str,
    pub team: Team,
    pub icon: &'static str,
    pub night_action: Option<NightAction>,
}

static WEREWOLF: Role = Role {
    name: RoleName::Werewolf,
    title: "Werewolf",
    team: Team::Werewolves,
    icon: "werewolf",
    night_action: Some(NightAction::Kill),
};

static SEER: Role = Role {
    name: RoleName::Seer,
    title: "Seer",
    team: Team::Villagers,
    icon: "seer",
    night_action: Some(NightAction::Inspect),
};

static VILLAGER: Role = Role {
    name: RoleName::Villager,
    title: "Villager",
    team: Team::Villagers,
    icon: "villager",
    night_action: None,
};

/// Read-only mapping from role name to descriptor.
pub struct RoleTable {
    by_name: HashMap<&'static str, &'static Role>,
}

impl RoleTable {
    fn build() -> Self {
        let by_name = [&WEREWOLF, &SEER, &VILLAGER]
            .into_iter()
            .map(|role| (role.name.as_str(), role))
            .collect();
        Self { by_name }
    }

    pub fn get(&self, name: &str) -> Option<&'static Role> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

pub static ROLES: Lazy<RoleTable> = Lazy::new(RoleTable::build);

impl RoleName {
    pub const fn as_str(self) -> &'static str {
        match self {
            RoleName::Werewolf => "werewolf",
            RoleName::Seer => "seer",
            RoleName::Villager => "villager",
        }
    }

    /// Descriptor for this role.
    pub fn role(self) -> &'static Role {
        match self {
            RoleName::Werewolf => &WEREWOLF,
            RoleName::Seer => &SEER,
            RoleName::Villager => &VILLAGER,
        }
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ROLES
            .get(s.trim().to_ascii_lowercase().as_str())
            .map(|role| role.name)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Role, format!("unknown role '{s}'")))
    }
}
