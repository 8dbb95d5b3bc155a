//! The core of vcplay: per-chat queues, the playback controller, and the traits
//! of every collaborator it drives.

mod backend;
mod config;
mod events;
mod notify;
mod playback;
mod queuing;
mod resolving;

#[cfg(test)]
mod testing;

pub use backend::*;
pub use config::*;
pub use events::*;
pub use notify::*;
pub use playback::*;
pub use queuing::*;
pub use resolving::*;

/// Identifies a chat on the messaging platform
pub type ChatId = i64;

/// Identifies a user on the messaging platform
pub type UserId = i64;
