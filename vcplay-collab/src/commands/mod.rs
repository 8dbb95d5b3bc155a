//! The chat commands, and the table mapping their names to them.

mod handlers;
mod parse;
pub mod reply;

pub use parse::*;

use std::collections::HashMap;

/// Every command the bot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Play,
    VideoPlay,
    Skip,
    Stop,
    Pause,
    Resume,
    Mute,
    Unmute,
    Volume,
    Playlist,
    Reload,
}

impl Command {
    pub const ALL: [Command; 11] = [
        Command::Play,
        Command::VideoPlay,
        Command::Skip,
        Command::Stop,
        Command::Pause,
        Command::Resume,
        Command::Mute,
        Command::Unmute,
        Command::Volume,
        Command::Playlist,
        Command::Reload,
    ];

    /// The names the command is invoked by
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Command::Play => &["play"],
            Command::VideoPlay => &["vplay"],
            Command::Skip => &["skip", "vskip"],
            Command::Stop => &["stop", "end", "vstop"],
            Command::Pause => &["pause", "vpause"],
            Command::Resume => &["resume", "vresume"],
            Command::Mute => &["mute", "vmute"],
            Command::Unmute => &["unmute", "vunmute"],
            Command::Volume => &["volume", "vol"],
            Command::Playlist => &["playlist", "queue"],
            Command::Reload => &["reload"],
        }
    }

    /// Returns true if the command changes the call, so the caller must pass the [crate::AuthorizationGate].
    /// Requesting and listing tracks is open to everyone.
    pub fn requires_authorization(&self) -> bool {
        !matches!(
            self,
            Command::Play | Command::VideoPlay | Command::Playlist
        )
    }
}

/// Maps command names to commands. Built once at startup.
#[derive(Debug, Clone)]
pub struct CommandTable {
    commands: HashMap<&'static str, Command>,
}

impl CommandTable {
    pub fn new() -> Self {
        let commands = Command::ALL
            .iter()
            .flat_map(|command| command.aliases().iter().map(move |alias| (*alias, *command)))
            .collect();

        Self { commands }
    }

    /// Looks up a command by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<Command> {
        self.commands.get(name.to_lowercase().as_str()).copied()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}
