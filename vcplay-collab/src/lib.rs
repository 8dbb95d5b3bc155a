//! The chat-facing side of vcplay: who may control playback, how requests are
//! turned into streams, and how commands are dispatched and answered.

mod admins;
mod commands;
mod config;
mod input;
mod util;

#[cfg(test)]
mod testing;

use std::sync::Arc;

pub use admins::*;
pub use commands::*;
pub use config::*;
pub use input::*;
pub use util::is_url;

use log::debug;
use vcplay_core::{ChatId, PlaybackController, PlaybackError, UserId};

/// The vcplay collab system, answering chat commands on top of the [PlaybackController].
pub struct Collab {
    config: CollabConfig,
    controller: Arc<PlaybackController>,
    gate: AuthorizationGate,
    search: Arc<dyn Search>,
    commands: CommandTable,
}

impl Collab {
    pub fn new(
        config: CollabConfig,
        controller: Arc<PlaybackController>,
        lookup: Arc<dyn PrivilegeLookup>,
        search: Arc<dyn Search>,
    ) -> Self {
        let gate = AuthorizationGate::new(config.super_users.clone(), lookup);

        Self {
            config,
            controller,
            gate,
            search,
            commands: CommandTable::new(),
        }
    }

    pub fn controller(&self) -> &Arc<PlaybackController> {
        &self.controller
    }

    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    pub fn config(&self) -> &CollabConfig {
        &self.config
    }

    /// Handles a chat message. Returns the reply, or None if the message wasn't a command for us.
    pub async fn handle(&self, chat_id: ChatId, caller: UserId, text: &str) -> Option<String> {
        let invocation = Invocation::parse(text, &self.config)?;
        let command = self.commands.get(&invocation.name)?;

        debug!(
            "{} invoked {:?} in chat {} with {:?}",
            caller, command, chat_id, invocation.rest
        );

        if command.requires_authorization() && !self.gate.is_authorized(caller, chat_id).await {
            return Some(reply::error(&PlaybackError::PermissionDenied));
        }

        Some(self.execute(chat_id, caller, command, &invocation).await)
    }
}
