use async_trait::async_trait;
use thiserror::Error;
use vcplay_core::ResolveError;

mod ytdlp;

pub use ytdlp::*;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Input is invalid: {0}")]
    Invalid(String),

    #[error("No results were found")]
    NotFound,

    #[error("Resource was found but is unavailable")]
    Unavailable,

    #[error("Failed to fetch resource: {0}")]
    FetchError(String),

    #[error("Failed to parse resource: {0}")]
    ParseError(String),

    #[error("{0}")]
    Other(String),
}

impl From<InputError> for ResolveError {
    fn from(value: InputError) -> Self {
        match value {
            InputError::NotFound | InputError::Unavailable => ResolveError::NotFound,
            other => ResolveError::Failed(other.to_string()),
        }
    }
}

/// The best match of a search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
}

/// Turns free text into a link that can be resolved.
#[async_trait]
pub trait Search
where
    Self: Send + Sync + 'static,
{
    async fn search(&self, query: &str) -> Result<SearchResult, InputError>;
}
