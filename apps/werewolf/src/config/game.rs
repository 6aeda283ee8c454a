use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::RoleDistribution;
use crate::error::AppError;

/// Timing and population settings for one match.
///
/// Durations are read from the environment in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Fewest distinct joiners needed to start (`WEREWOLF_MIN_PLAYERS`).
    pub min_players: usize,
    /// How long the lobby accepts joins (`WEREWOLF_LOBBY_COUNTDOWN_MS`).
    pub lobby_countdown: Duration,
    /// Countdown announced with `START_GAME_COUNTDOWN` (`WEREWOLF_START_COUNTDOWN_MS`).
    pub start_countdown: Duration,
    /// `WEREWOLF_NIGHT_MS`
    pub night: Duration,
    /// `WEREWOLF_DAY_DISCUSSION_MS`
    pub day_discussion: Duration,
    /// `WEREWOLF_DAY_VOTING_MS`
    pub day_voting: Duration,
    /// Time sessions stay attached after `GAME_OVER` (`WEREWOLF_GAME_OVER_LINGER_MS`).
    pub game_over_linger: Duration,
    /// Safety bound on full night/day rounds (`WEREWOLF_MAX_ROUNDS`).
    pub max_rounds: u32,
    /// Roles by join order (`WEREWOLF_ROLES`, e.g. `werewolf,seer`).
    pub role_distribution: RoleDistribution,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            lobby_countdown: Duration::from_secs(30),
            start_countdown: Duration::from_secs(10),
            night: Duration::from_secs(30),
            day_discussion: Duration::from_secs(15),
            day_voting: Duration::from_secs(30),
            game_over_linger: Duration::from_secs(10),
            max_rounds: 10,
            role_distribution: RoleDistribution::default(),
        }
    }
}

impl GameConfig {
    /// Build from `WEREWOLF_*` variables, falling back to defaults for
    /// anything unset.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();
        let config = Self {
            min_players: parse_var("WEREWOLF_MIN_PLAYERS")?.unwrap_or(defaults.min_players),
            lobby_countdown: millis_var("WEREWOLF_LOBBY_COUNTDOWN_MS")?
                .unwrap_or(defaults.lobby_countdown),
            start_countdown: millis_var("WEREWOLF_START_COUNTDOWN_MS")?
                .unwrap_or(defaults.start_countdown),
            night: millis_var("WEREWOLF_NIGHT_MS")?.unwrap_or(defaults.night),
            day_discussion: millis_var("WEREWOLF_DAY_DISCUSSION_MS")?
                .unwrap_or(defaults.day_discussion),
            day_voting: millis_var("WEREWOLF_DAY_VOTING_MS")?.unwrap_or(defaults.day_voting),
            game_over_linger: millis_var("WEREWOLF_GAME_OVER_LINGER_MS")?
                .unwrap_or(defaults.game_over_linger),
            max_rounds: parse_var("WEREWOLF_MAX_ROUNDS")?.unwrap_or(defaults.max_rounds),
            role_distribution: match env::var("WEREWOLF_ROLES") {
                Ok(raw) => RoleDistribution::from_str(&raw)
                    .map_err(|e| AppError::config(format!("WEREWOLF_ROLES: {e}")))?,
                Err(_) => defaults.role_distribution,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Durations are taken as given. The role distribution is non-empty by
    /// construction.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.min_players < 2 {
            return Err(AppError::config(format!(
                "min_players must be at least 2, got {}",
                self.min_players
            )));
        }
        if self.max_rounds == 0 {
            return Err(AppError::config("max_rounds must be at least 1"));
        }
        Ok(())
    }
}

/// Parse an optional environment variable
fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, AppError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            AppError::config(format!(
                "Environment variable '{name}' has invalid value '{raw}': {e}"
            ))
        }),
        Err(_) => Ok(None),
    }
}

fn millis_var(name: &str) -> Result<Option<Duration>, AppError> {
    Ok(parse_var::<u64>(name)?.map(Duration::from_millis))
}
