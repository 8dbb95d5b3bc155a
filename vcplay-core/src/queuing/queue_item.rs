use std::fmt::Display;

use crate::UserId;

/// Whether an item is streamed as audio only, or as audio and video.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    #[default]
    Audio,
    Video,
}

/// A single requested track in a chat's queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    /// The display name.
    pub title: String,
    /// The resolved locator the backend can stream directly.
    ///
    /// Empty until the item has been resolved, and it must be resolved before it becomes the head.
    pub source: String,
    /// The link or search query the user originally asked for.
    pub origin_link: String,
    pub media_type: MediaType,
    /// Requested resolution tier, 0 means default (or audio only).
    pub quality: u32,
    /// Who requested the item, if known.
    pub requested_by: Option<UserId>,
}

impl QueueItem {
    /// Creates an unresolved item.
    pub fn new(title: impl Into<String>, origin_link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: String::new(),
            origin_link: origin_link.into(),
            media_type: MediaType::Audio,
            quality: 0,
            requested_by: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_video(mut self, quality: u32) -> Self {
        self.media_type = MediaType::Video;
        self.quality = quality;
        self
    }

    pub fn requested_by(mut self, user_id: UserId) -> Self {
        self.requested_by = Some(user_id);
        self
    }

    /// Returns true if the item has a playable locator.
    pub fn is_resolved(&self) -> bool {
        !self.source.trim().is_empty()
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Audio => write!(f, "Audio"),
            MediaType::Video => write!(f, "Video"),
        }
    }
}
