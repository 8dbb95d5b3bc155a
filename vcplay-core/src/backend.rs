use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::{ChatId, MediaType};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The backend is rate limiting us and asked to wait before retrying.
    #[error("Backend is flooded, retry after {}s", retry_after.as_secs())]
    Flood { retry_after: Duration },

    /// The backend understood the request but refused it, for example because no call is active.
    #[error("Backend rejected the request: {0}")]
    Rejected(String),

    /// The backend could not be reached or answered garbage.
    #[error("Backend is unreachable: {0}")]
    Transport(String),
}

/// The capabilities of the streaming backend that transmits media into a chat's call.
///
/// Lifecycle events raised by the backend are delivered separately as [crate::StreamEvent]s.
#[async_trait]
pub trait StreamBackend
where
    Self: Send + Sync + 'static,
{
    /// Joins the chat's call and starts streaming the locator.
    async fn join_call(
        &self,
        chat_id: ChatId,
        source: &str,
        media_type: MediaType,
        quality: u32,
    ) -> Result<(), BackendError>;

    /// Replaces the active stream of a call that was already joined.
    async fn change_stream(
        &self,
        chat_id: ChatId,
        source: &str,
        media_type: MediaType,
        quality: u32,
    ) -> Result<(), BackendError>;

    async fn leave_call(&self, chat_id: ChatId) -> Result<(), BackendError>;

    async fn pause(&self, chat_id: ChatId) -> Result<(), BackendError>;

    async fn resume(&self, chat_id: ChatId) -> Result<(), BackendError>;

    async fn mute(&self, chat_id: ChatId) -> Result<(), BackendError>;

    async fn unmute(&self, chat_id: ChatId) -> Result<(), BackendError>;

    /// Sets the volume of the call, in percent.
    async fn set_volume(&self, chat_id: ChatId, percent: u32) -> Result<(), BackendError>;
}
