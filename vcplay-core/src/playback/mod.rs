//! The playback controller drives a chat's call through the streaming backend,
//! and the router feeds backend lifecycle events back into it.

mod controller;
mod router;
mod state;

pub use controller::*;
pub use router::*;
pub use state::*;

use thiserror::Error;

use crate::{BackendError, QueueItem};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("You are not allowed to manage the video chat")]
    PermissionDenied,

    #[error("Nothing is streaming")]
    NothingStreaming,

    #[error("Something is already streaming in this chat")]
    AlreadyStreaming,

    #[error("Failed to start the stream: {0}")]
    StreamStartFailure(String),

    /// Switching or leaving failed while advancing. The queue was cleared.
    #[error("Failed to switch streams: {0}")]
    BackendTransitionFailure(String),

    #[error("{0}")]
    ResolutionFailure(String),

    #[error("There is no item at position {index}, the queue has {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Volume must be between 0 and 200, got {0}")]
    VolumeOutOfRange(i32),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// The result of advancing a chat's queue past its head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// There was no queue to advance.
    NoQueue,
    /// The head was the last item, so the call was left.
    QueueExhausted,
    /// The backend failed to switch to the next item. The call was left and the queue cleared.
    BackendError(PlaybackError),
    /// The next item is now streaming.
    Advanced(QueueItem),
}

/// The result of requesting a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requested {
    /// Nothing was streaming, so the call was joined with this item.
    Started(QueueItem),
    /// Something is already streaming, the item was queued at this position.
    Queued { position: usize, item: QueueItem },
}

/// The result of removing an item from the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub removed: QueueItem,
    /// Set when the removed item was the one streaming, and the queue had to advance.
    pub advance: Option<AdvanceOutcome>,
}
