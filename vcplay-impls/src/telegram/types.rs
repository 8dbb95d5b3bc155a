use serde::Deserialize;
use vcplay_collab::ChatMember;

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub error_code: Option<u16>,
    pub description: Option<String>,
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseParameters {
    pub retry_after: Option<u64>,
}

/// A Telegram user, or bot
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    pub username: Option<String>,
}

/// An entry of `getChatAdministrators`
#[derive(Debug, Clone, Deserialize)]
pub struct Administrator {
    pub status: String,
    pub user: User,
    #[serde(default)]
    pub can_manage_video_chats: bool,
}

impl From<Administrator> for ChatMember {
    fn from(value: Administrator) -> Self {
        ChatMember {
            user_id: value.user.id,
            // Deleted accounts keep their id but lose their name
            is_deleted: value.user.first_name.is_empty(),
            is_owner: value.status == "creator",
            can_manage_video_chats: value.can_manage_video_chats,
        }
    }
}
