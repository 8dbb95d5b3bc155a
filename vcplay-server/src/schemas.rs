use serde::Deserialize;

/// An incoming Telegram update. Only the parts vcplay reacts to are read.
#[derive(Debug, Deserialize)]
pub struct UpdateSchema {
    pub update_id: i64,
    pub message: Option<MessageSchema>,
}

#[derive(Debug, Deserialize)]
pub struct MessageSchema {
    pub chat: ChatSchema,
    pub from: Option<UserSchema>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatSchema {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UserSchema {
    pub id: i64,
}

/// A command message, with who sent it where.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandMessage {
    pub chat_id: i64,
    pub caller: i64,
    pub text: String,
}

impl UpdateSchema {
    /// Returns the text message of the update, if it has one with a known sender.
    /// Messages sent on behalf of a chat have no sender and are ignored.
    pub fn into_command_message(self) -> Option<CommandMessage> {
        let message = self.message?;

        Some(CommandMessage {
            chat_id: message.chat.id,
            caller: message.from?.id,
            text: message.text?,
        })
    }
}
