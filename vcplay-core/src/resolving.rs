use async_trait::async_trait;
use thiserror::Error;

use crate::MediaType;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No playable stream was found")]
    NotFound,

    #[error("Resolving the stream timed out")]
    Timeout,

    #[error("Failed to resolve stream: {0}")]
    Failed(String),
}

/// Turns a link or a search query into a locator the backend can stream directly.
///
/// Implementors are expected to be idempotent. The controller bounds every call with a timeout.
#[async_trait]
pub trait Resolver
where
    Self: Send + Sync + 'static,
{
    async fn resolve(
        &self,
        query: &str,
        media_type: MediaType,
        quality: u32,
    ) -> Result<String, ResolveError>;
}
