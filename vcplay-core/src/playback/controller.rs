use std::{collections::BTreeSet, future::Future, sync::Arc};

use dashmap::DashMap;
use log::{error, info, warn};
use tokio::time::timeout;

use crate::{
    BackendError, ChatId, Config, QueueItem, QueueStore, ResolveError, Resolver, StreamBackend,
};

use super::{AdvanceOutcome, ChatSlot, ChatState, PlaybackError, Requested, Skipped};

/// Orchestrates every state transition of a chat's call.
///
/// Operations on the same chat are serialized through its [ChatSlot], so an advance triggered
/// by the backend can never interleave with a skip issued by a user. Different chats run concurrently.
pub struct PlaybackController {
    config: Config,
    queues: QueueStore,
    slots: DashMap<ChatId, Arc<ChatSlot>>,
    backend: Arc<dyn StreamBackend>,
    resolver: Arc<dyn Resolver>,
}

impl PlaybackController {
    pub fn new(
        config: Config,
        backend: Arc<dyn StreamBackend>,
        resolver: Arc<dyn Resolver>,
    ) -> Self {
        Self {
            config,
            backend,
            resolver,
            queues: Default::default(),
            slots: Default::default(),
        }
    }

    /// Joins the chat's call with the item. Fails if something is already queued.
    pub async fn start(&self, chat_id: ChatId, item: QueueItem) -> Result<QueueItem, PlaybackError> {
        let item = self.resolve(item).await?;

        let result = {
            let slot = self.slot(chat_id);
            let _guard = slot.lock().await;

            if self.queues.contains(chat_id) {
                Err(PlaybackError::AlreadyStreaming)
            } else {
                self.start_locked(chat_id, &slot, item).await
            }
        };

        self.release(chat_id);
        result
    }

    /// Starts the item if nothing is streaming, otherwise queues it.
    pub async fn request(&self, chat_id: ChatId, item: QueueItem) -> Result<Requested, PlaybackError> {
        // Resolution can take a while, so it happens before the chat is locked.
        let item = self.resolve(item).await?;

        let requested = {
            let slot = self.slot(chat_id);
            let _guard = slot.lock().await;

            if self.queues.len(chat_id) == 0 {
                self.start_locked(chat_id, &slot, item)
                    .await
                    .map(Requested::Started)
            } else {
                let position = self.queues.enqueue(chat_id, item.clone());
                info!("Queued {} at position {} in chat {}", item.title, position, chat_id);

                Ok(Requested::Queued { position, item })
            }
        };

        self.release(chat_id);
        requested
    }

    /// Moves past the current head, streaming the next item or leaving the call.
    pub async fn advance(&self, chat_id: ChatId) -> AdvanceOutcome {
        let outcome = {
            let slot = self.slot(chat_id);
            let _guard = slot.lock().await;

            self.advance_locked(chat_id, &slot).await
        };

        self.release(chat_id);
        outcome
    }

    /// Removes the item at the index. Removing the head advances the queue.
    pub async fn skip_at(&self, chat_id: ChatId, index: usize) -> Result<Skipped, PlaybackError> {
        let result = {
            let slot = self.slot(chat_id);
            let _guard = slot.lock().await;

            self.skip_at_locked(chat_id, &slot, index).await
        };

        self.release(chat_id);
        result
    }

    /// Removes several queued items at once, highest index first so earlier removals don't shift later ones.
    ///
    /// The head is never touched here; index 0 is ignored.
    pub async fn skip_many(
        &self,
        chat_id: ChatId,
        indices: &[usize],
    ) -> Result<Vec<(usize, Result<QueueItem, PlaybackError>)>, PlaybackError> {
        let results = {
            let slot = self.slot(chat_id);
            let _guard = slot.lock().await;

            self.skip_many_locked(chat_id, &slot, indices).await
        };

        self.release(chat_id);
        results
    }

    /// Leaves the call and forgets the queue. Returns whether anything was queued.
    pub async fn stop(&self, chat_id: ChatId) -> bool {
        let was_present = {
            let slot = self.slot(chat_id);
            let _guard = slot.lock().await;

            self.leave_locked(chat_id, &slot).await
        };

        self.release(chat_id);
        was_present
    }

    /// Forgets the queue without telling the backend.
    /// Used when the backend reports that the call is already gone.
    pub async fn reset(&self, chat_id: ChatId) -> bool {
        let was_present = {
            let slot = self.slot(chat_id);
            let _guard = slot.lock().await;

            slot.set_state(ChatState::Idle);
            self.queues.clear(chat_id)
        };

        if was_present {
            info!("Queue of chat {} was reset", chat_id);
        }

        self.release(chat_id);
        was_present
    }

    /// Leaves every call that has a queue.
    pub async fn stop_all(&self) {
        for chat_id in self.queues.chats() {
            self.stop(chat_id).await;
        }
    }

    pub async fn pause(&self, chat_id: ChatId) -> Result<(), PlaybackError> {
        self.control(chat_id, "pause", || self.backend.pause(chat_id))
            .await
    }

    pub async fn resume(&self, chat_id: ChatId) -> Result<(), PlaybackError> {
        self.control(chat_id, "resume", || self.backend.resume(chat_id))
            .await
    }

    pub async fn mute(&self, chat_id: ChatId) -> Result<(), PlaybackError> {
        self.control(chat_id, "mute", || self.backend.mute(chat_id))
            .await
    }

    pub async fn unmute(&self, chat_id: ChatId) -> Result<(), PlaybackError> {
        self.control(chat_id, "unmute", || self.backend.unmute(chat_id))
            .await
    }

    /// Sets the call volume in percent. Values outside 0..=200 never reach the backend.
    pub async fn set_volume(&self, chat_id: ChatId, percent: i32) -> Result<(), PlaybackError> {
        if !self.config.is_valid_volume(percent) {
            return Err(PlaybackError::VolumeOutOfRange(percent));
        }

        let percent = percent as u32;
        self.control(chat_id, "set volume", || {
            self.backend.set_volume(chat_id, percent)
        })
        .await
    }

    /// Returns the streaming item, if any
    pub fn now_playing(&self, chat_id: ChatId) -> Option<QueueItem> {
        self.queues.peek(chat_id)
    }

    /// Returns a snapshot of the queue, head first
    pub fn queue(&self, chat_id: ChatId) -> Vec<QueueItem> {
        self.queues.items(chat_id)
    }

    pub fn is_streaming(&self, chat_id: ChatId) -> bool {
        self.queues.contains(chat_id)
    }

    pub fn state(&self, chat_id: ChatId) -> ChatState {
        self.slots
            .get(&chat_id)
            .map(|s| s.state())
            .unwrap_or_default()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn slot(&self, chat_id: ChatId) -> Arc<ChatSlot> {
        self.slots.entry(chat_id).or_default().clone()
    }

    /// Forgets the chat's slot once nobody holds it and the chat has nothing queued.
    fn release(&self, chat_id: ChatId) {
        self.slots.remove_if(&chat_id, |_, slot| {
            Arc::strong_count(slot) == 1
                && slot.state() == ChatState::Idle
                && !self.queues.contains(chat_id)
        });
    }

    async fn resolve(&self, mut item: QueueItem) -> Result<QueueItem, PlaybackError> {
        if item.is_resolved() {
            return Ok(item);
        }

        let lookup = self
            .resolver
            .resolve(&item.origin_link, item.media_type, item.quality);

        let source = match timeout(self.config.resolve_timeout, lookup).await {
            Ok(Ok(source)) if !source.trim().is_empty() => source,
            Ok(Ok(_)) => return Err(ResolveError::NotFound.into()),
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => return Err(ResolveError::Timeout.into()),
        };

        item.source = source;
        Ok(item)
    }

    async fn start_locked(
        &self,
        chat_id: ChatId,
        slot: &ChatSlot,
        item: QueueItem,
    ) -> Result<QueueItem, PlaybackError> {
        slot.set_state(ChatState::Joining);

        let joined = self
            .with_flood_retry(chat_id, "join", || {
                self.backend
                    .join_call(chat_id, &item.source, item.media_type, item.quality)
            })
            .await;

        match joined {
            Ok(()) => {
                self.queues.enqueue(chat_id, item.clone());
                slot.set_state(ChatState::Playing);
                info!("Started streaming {} in chat {}", item.title, chat_id);

                Ok(item)
            }
            Err(err) => {
                slot.set_state(ChatState::Idle);
                warn!("Failed to join call in chat {}: {}", chat_id, err);

                Err(PlaybackError::StreamStartFailure(err.to_string()))
            }
        }
    }

    async fn advance_locked(&self, chat_id: ChatId, slot: &ChatSlot) -> AdvanceOutcome {
        let next = match self.queues.len(chat_id) {
            0 => return AdvanceOutcome::NoQueue,
            1 => {
                self.leave_locked(chat_id, slot).await;
                return AdvanceOutcome::QueueExhausted;
            }
            _ => self.queues.get(chat_id, 1).filter(QueueItem::is_resolved),
        };

        let Some(next) = next else {
            return self
                .abort_advance(chat_id, slot, "next item has no playable source".to_string())
                .await;
        };

        let switched = self
            .with_flood_retry(chat_id, "change stream", || {
                self.backend
                    .change_stream(chat_id, &next.source, next.media_type, next.quality)
            })
            .await;

        if let Err(err) = switched {
            return self.abort_advance(chat_id, slot, err.to_string()).await;
        }

        // The old head is only dropped once the backend is actually streaming the next one.
        self.queues.pop_head(chat_id);
        slot.set_state(ChatState::Playing);
        info!("Advanced to {} in chat {}", next.title, chat_id);

        AdvanceOutcome::Advanced(next)
    }

    /// Gives up on the queue after a failed transition, so local state can't drift from the backend's.
    async fn abort_advance(&self, chat_id: ChatId, slot: &ChatSlot, reason: String) -> AdvanceOutcome {
        error!(
            "Failed to advance queue in chat {}, leaving the call: {}",
            chat_id, reason
        );
        self.leave_locked(chat_id, slot).await;

        AdvanceOutcome::BackendError(PlaybackError::BackendTransitionFailure(reason))
    }

    async fn skip_at_locked(
        &self,
        chat_id: ChatId,
        slot: &ChatSlot,
        index: usize,
    ) -> Result<Skipped, PlaybackError> {
        let len = self.queues.len(chat_id);

        if index >= len {
            return Err(PlaybackError::IndexOutOfRange { index, len });
        }

        if index == 0 {
            let removed = self
                .queues
                .peek(chat_id)
                .ok_or(PlaybackError::NothingStreaming)?;
            let outcome = self.advance_locked(chat_id, slot).await;

            return Ok(Skipped {
                removed,
                advance: Some(outcome),
            });
        }

        let removed = self
            .queues
            .remove_at(chat_id, index)
            .ok_or(PlaybackError::IndexOutOfRange { index, len })?;

        info!("Removed {} from the queue of chat {}", removed.title, chat_id);

        Ok(Skipped {
            removed,
            advance: None,
        })
    }

    async fn skip_many_locked(
        &self,
        chat_id: ChatId,
        slot: &ChatSlot,
        indices: &[usize],
    ) -> Result<Vec<(usize, Result<QueueItem, PlaybackError>)>, PlaybackError> {
        if !self.queues.contains(chat_id) {
            return Err(PlaybackError::NothingStreaming);
        }

        let indices: BTreeSet<_> = indices.iter().copied().filter(|i| *i > 0).collect();
        let mut results = Vec::with_capacity(indices.len());

        for index in indices.into_iter().rev() {
            let result = self
                .skip_at_locked(chat_id, slot, index)
                .await
                .map(|skipped| skipped.removed);

            results.push((index, result));
        }

        Ok(results)
    }

    /// Leaves the call, ignoring backend errors, and clears the queue.
    async fn leave_locked(&self, chat_id: ChatId, slot: &ChatSlot) -> bool {
        slot.set_state(ChatState::Leaving);

        let left = self
            .with_flood_retry(chat_id, "leave", || self.backend.leave_call(chat_id))
            .await;

        if let Err(err) = left {
            warn!("Failed to leave call in chat {}: {}", chat_id, err);
        }

        let was_present = self.queues.clear(chat_id);
        slot.set_state(ChatState::Idle);

        info!("Left call in chat {}", chat_id);
        was_present
    }

    async fn control<F, Fut>(
        &self,
        chat_id: ChatId,
        action: &str,
        call: F,
    ) -> Result<(), PlaybackError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<(), BackendError>>,
    {
        let result = {
            let slot = self.slot(chat_id);
            let _guard = slot.lock().await;

            if self.queues.contains(chat_id) {
                self.with_flood_retry(chat_id, action, call)
                    .await
                    .map_err(PlaybackError::from)
            } else {
                Err(PlaybackError::NothingStreaming)
            }
        };

        if result.is_ok() {
            info!("Applied {} in chat {}", action, chat_id);
        }

        self.release(chat_id);
        result
    }

    /// Runs a backend call, retrying exactly once if the backend asks us to back off.
    async fn with_flood_retry<F, Fut>(
        &self,
        chat_id: ChatId,
        action: &str,
        call: F,
    ) -> Result<(), BackendError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<(), BackendError>>,
    {
        match call().await {
            Err(BackendError::Flood { retry_after }) => {
                let wait = self.config.flood_wait(retry_after);
                warn!(
                    "Backend flooded during {} in chat {}, retrying in {:?}",
                    action, chat_id, wait
                );

                tokio::time::sleep(wait).await;
                call().await
            }
            result => result,
        }
    }
}

impl From<ResolveError> for PlaybackError {
    fn from(value: ResolveError) -> Self {
        PlaybackError::ResolutionFailure(value.to_string())
    }
}
