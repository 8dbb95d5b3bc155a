use serde::Deserialize;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::ChatId;

pub type EventSender = UnboundedSender<StreamEvent>;
pub type EventReceiver = UnboundedReceiver<StreamEvent>;

/// Lifecycle events raised by the streaming backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "kebab-case")]
pub enum StreamEvent {
    /// The active track finished playing.
    StreamEnded { chat_id: ChatId },
    /// The assistant account was removed from the call.
    Kicked { chat_id: ChatId },
    /// The call itself was closed.
    CallClosed { chat_id: ChatId },
    /// The assistant account left the call.
    Left { chat_id: ChatId },
}

impl StreamEvent {
    pub fn chat_id(&self) -> ChatId {
        match *self {
            Self::StreamEnded { chat_id }
            | Self::Kicked { chat_id }
            | Self::CallClosed { chat_id }
            | Self::Left { chat_id } => chat_id,
        }
    }
}

/// Creates the channel the backend adapter pushes events into.
pub fn event_channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}
