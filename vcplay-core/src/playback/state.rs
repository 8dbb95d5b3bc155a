use crossbeam::atomic::AtomicCell;
use tokio::sync::{Mutex, MutexGuard};

/// What the controller is doing with a chat's call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    /// Nothing is queued and no call is joined.
    #[default]
    Idle,
    /// A join was requested but the backend has not confirmed it yet.
    Joining,
    /// The head of the queue is streaming.
    Playing,
    /// The call is being left and the queue is about to be cleared.
    Leaving,
}

/// Serializes every check, backend call and queue mutation for a single chat.
///
/// The state tag can be read at any time without waiting for the lock.
#[derive(Debug, Default)]
pub struct ChatSlot {
    lock: Mutex<()>,
    state: AtomicCell<ChatState>,
}

impl ChatSlot {
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    pub fn state(&self) -> ChatState {
        self.state.load()
    }

    pub fn set_state(&self, new_state: ChatState) {
        self.state.store(new_state);
    }
}
