//! Who may manage a chat's playback.

mod cache;
mod gate;

pub use cache::*;
pub use gate::*;

use async_trait::async_trait;
use thiserror::Error;
use vcplay_core::{ChatId, UserId};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("Failed to look up the chat's administrators: {0}")]
    Unavailable(String),
}

/// A privileged member of a chat, as reported by the messaging platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMember {
    pub user_id: UserId,
    pub is_deleted: bool,
    pub is_owner: bool,
    pub can_manage_video_chats: bool,
}

impl ChatMember {
    /// Returns true if the member may manage the chat's video chats.
    /// Deleted accounts never can, owners always can.
    pub fn is_privileged(&self) -> bool {
        !self.is_deleted && (self.is_owner || self.can_manage_video_chats)
    }
}

/// Lists the privileged members of a chat.
#[async_trait]
pub trait PrivilegeLookup
where
    Self: Send + Sync + 'static,
{
    async fn list_privileged(&self, chat_id: ChatId) -> Result<Vec<ChatMember>, LookupError>;
}
