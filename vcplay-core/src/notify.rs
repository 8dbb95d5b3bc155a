use async_trait::async_trait;

use crate::ChatId;

/// Sends text back to a chat. Delivery is best-effort; implementors log failures instead of returning them.
#[async_trait]
pub trait Notifier
where
    Self: Send + Sync + 'static,
{
    async fn notify(&self, chat_id: ChatId, text: &str);
}
