use std::{env, str::FromStr, time::Duration};

use log::warn;

/// The configuration of the playback controller
#[derive(Debug, Clone)]
pub struct Config {
    /// How long media resolution may take before it counts as failed
    pub resolve_timeout: Duration,
    /// The longest a flood wait reported by the backend is honored before retrying once
    pub max_flood_wait: Duration,
    /// The lowest volume accepted, in percent
    pub min_volume: i32,
    /// The highest volume accepted, in percent
    pub max_volume: i32,
}

impl Config {
    pub const RESOLVE_TIMEOUT_VAR: &'static str = "VCPLAY_RESOLVE_TIMEOUT_SECS";
    pub const MAX_FLOOD_WAIT_VAR: &'static str = "VCPLAY_MAX_FLOOD_WAIT_SECS";

    /// Reads the configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            resolve_timeout: env_secs(Self::RESOLVE_TIMEOUT_VAR).unwrap_or(default.resolve_timeout),
            max_flood_wait: env_secs(Self::MAX_FLOOD_WAIT_VAR).unwrap_or(default.max_flood_wait),
            ..default
        }
    }

    /// Returns true if the volume is within the accepted range
    pub fn is_valid_volume(&self, volume: i32) -> bool {
        (self.min_volume..=self.max_volume).contains(&volume)
    }

    /// Caps a flood wait to [Config::max_flood_wait]
    pub fn flood_wait(&self, requested: Duration) -> Duration {
        requested.min(self.max_flood_wait)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // yt-dlp usually answers within a few seconds, but extraction can stall
            resolve_timeout: Duration::from_secs(25),
            max_flood_wait: Duration::from_secs(30),
            min_volume: 0,
            max_volume: 200,
        }
    }
}

/// Parses an environment variable, warning if it is set but malformed.
pub fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;

    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring malformed {}: {:?}", name, raw);
            None
        }
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    env_parse::<u64>(name).map(Duration::from_secs)
}
