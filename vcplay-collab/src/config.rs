use std::collections::BTreeSet;

use log::warn;
use vcplay_core::{env_parse, UserId};

/// The configuration of the chat-facing side of vcplay
#[derive(Debug, Clone)]
pub struct CollabConfig {
    /// Users that are authorized everywhere, regardless of their chat privileges
    pub super_users: BTreeSet<UserId>,
    /// Characters a message must start with to be read as a command
    pub prefixes: Vec<char>,
    /// The bot's username, so `/skip@name` is accepted. Commands addressed to other bots are ignored.
    pub bot_username: Option<String>,
}

impl CollabConfig {
    pub const SUDO_USERS_VAR: &'static str = "VCPLAY_SUDO_USERS";
    pub const PREFIXES_VAR: &'static str = "VCPLAY_COMMAND_PREFIXES";
    pub const BOT_USERNAME_VAR: &'static str = "VCPLAY_BOT_USERNAME";

    pub fn from_env() -> Self {
        let default = Self::default();

        let super_users = std::env::var(Self::SUDO_USERS_VAR)
            .map(|raw| parse_super_users(&raw))
            .unwrap_or(default.super_users);

        let prefixes = env_parse::<String>(Self::PREFIXES_VAR)
            .map(|raw| parse_prefixes(&raw))
            .filter(|p| !p.is_empty())
            .unwrap_or(default.prefixes);

        let bot_username = env_parse::<String>(Self::BOT_USERNAME_VAR)
            .map(|name| name.trim_start_matches('@').to_string())
            .filter(|name| !name.is_empty());

        Self {
            super_users,
            prefixes,
            bot_username,
        }
    }
}

impl Default for CollabConfig {
    fn default() -> Self {
        Self {
            super_users: BTreeSet::new(),
            prefixes: vec!['/', '!', '.'],
            bot_username: None,
        }
    }
}

/// Parses whitespace separated user ids, skipping the malformed ones.
pub fn parse_super_users(raw: &str) -> BTreeSet<UserId> {
    raw.split_whitespace()
        .filter_map(|entry| match entry.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!("Skipping malformed super user id {:?}", entry);
                None
            }
        })
        .collect()
}

fn parse_prefixes(raw: &str) -> Vec<char> {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}
