/// Main configuration module.
///
/// Re-exports submodules for matchmaking, game, session and anti-spam
/// constants, and builds the runtime [`ServerConfig`] from the environment.
pub mod anti_spam;
pub mod game;
pub mod matchmaking;
pub mod session;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use log::warn;

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub matchmaking_interval: Duration,
    pub tick_interval: Duration,
    pub heartbeat_interval: Duration,
    pub client_timeout: Duration,
    /// How long a running match may go without any connection.
    pub abandon_timeout: Duration,
    /// Append-only match log. In-memory persistence when unset.
    pub match_log_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            matchmaking_interval: Duration::from_millis(matchmaking::MATCHMAKING_INTERVAL_MS),
            tick_interval: Duration::from_millis(game::TICK_INTERVAL_MS),
            heartbeat_interval: Duration::from_secs(session::HEARTBEAT_INTERVAL),
            client_timeout: Duration::from_secs(session::CLIENT_TIMEOUT),
            abandon_timeout: Duration::from_secs(session::ABANDON_TIMEOUT),
            match_log_path: None,
        }
    }
}

impl ServerConfig {
    /// Build the configuration from environment variables, keeping defaults
    /// for anything missing or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] but reads through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str, fallback: Duration| {
            Duration::from_millis(parse_or(&lookup, key, fallback.as_millis() as u64).max(1))
        };
        let secs = |key: &str, fallback: Duration| {
            Duration::from_secs(parse_or(&lookup, key, fallback.as_secs()).max(1))
        };

        let config = Self {
            host: lookup("HOST").unwrap_or(defaults.host.clone()),
            port: parse_or(&lookup, "PORT", defaults.port),
            matchmaking_interval: millis("MATCHMAKING_INTERVAL_MS", defaults.matchmaking_interval),
            tick_interval: millis("TICK_INTERVAL_MS", defaults.tick_interval),
            heartbeat_interval: secs("WS_PING_INTERVAL", defaults.heartbeat_interval),
            client_timeout: secs("WS_READ_TIMEOUT", defaults.client_timeout),
            abandon_timeout: secs("MATCH_ABANDON_TIMEOUT", defaults.abandon_timeout),
            match_log_path: lookup("MATCH_LOG_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        };

        if config.client_timeout <= config.heartbeat_interval {
            warn!(
                "[Config] WS_READ_TIMEOUT ({:?}) should exceed WS_PING_INTERVAL ({:?})",
                config.client_timeout, config.heartbeat_interval
            );
        }
        config
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, fallback: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("[Config] Ignoring invalid value for {}: {:?}", key, raw);
            fallback
        }),
        None => fallback,
    }
}
