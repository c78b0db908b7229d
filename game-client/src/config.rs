use std::env;
use std::str::FromStr;
use std::time::Duration;

use game_types::PlayerId;
use thiserror::Error;

use crate::poller::PollKind;
use crate::reveal::RevealTiming;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: String, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub authority_url: String,
    pub session_token: Option<String>,
    pub current_user: Option<PlayerId>,
    pub room_poll_interval: Duration,
    pub lobby_poll_interval: Duration,
    pub match_poll_interval: Duration,
    pub validation_poll_interval: Duration,
    pub leaderboard_poll_interval: Duration,
    pub reveal: RevealTiming,
    pub score_cache_ttl: chrono::Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset keys keep their defaults;
    /// empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            authority_url: get("AUTHORITY_URL").unwrap_or(defaults.authority_url),
            session_token: get("SESSION_TOKEN"),
            current_user: get("CURRENT_USER_ID"),
            room_poll_interval: millis(&get, "ROOM_POLL_INTERVAL_MS", defaults.room_poll_interval)?,
            lobby_poll_interval: millis(&get, "LOBBY_POLL_INTERVAL_MS", defaults.lobby_poll_interval)?,
            match_poll_interval: millis(&get, "MATCH_POLL_INTERVAL_MS", defaults.match_poll_interval)?,
            validation_poll_interval: millis(
                &get,
                "VALIDATION_POLL_INTERVAL_MS",
                defaults.validation_poll_interval,
            )?,
            leaderboard_poll_interval: millis(
                &get,
                "LEADERBOARD_POLL_INTERVAL_MS",
                defaults.leaderboard_poll_interval,
            )?,
            reveal: RevealTiming {
                tick: millis(&get, "REVEAL_TICK_MS", defaults.reveal.tick)?,
                spin_duration: millis(&get, "REVEAL_DURATION_MS", defaults.reveal.spin_duration)?,
            },
            score_cache_ttl: hours(&get, "SCORE_CACHE_TTL_HOURS", defaults.score_cache_ttl)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            authority_url: "http://127.0.0.1:8080".to_string(),
            session_token: None,
            current_user: None,
            room_poll_interval: PollKind::Room.default_interval(),
            lobby_poll_interval: PollKind::Lobby.default_interval(),
            match_poll_interval: PollKind::MatchState.default_interval(),
            validation_poll_interval: PollKind::Validations.default_interval(),
            leaderboard_poll_interval: PollKind::MonthlyLeaderboard.default_interval(),
            reveal: RevealTiming::default(),
            score_cache_ttl: chrono::Duration::hours(24),
        }
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// Positive millisecond interval.
fn millis(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(raw) = get(key) else {
        return Ok(default);
    };
    match parse::<u64>(key, &raw)? {
        0 => Err(ConfigError::Invalid {
            key: key.to_string(),
            value: raw,
        }),
        ms => Ok(Duration::from_millis(ms)),
    }
}

/// Positive, representable number of hours.
fn hours(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: chrono::Duration,
) -> Result<chrono::Duration, ConfigError> {
    let Some(raw) = get(key) else {
        return Ok(default);
    };
    let hours: i64 = parse(key, &raw)?;
    chrono::Duration::try_hours(hours)
        .filter(|ttl| *ttl > chrono::Duration::zero())
        .ok_or(ConfigError::Invalid {
            key: key.to_string(),
            value: raw,
        })
}
