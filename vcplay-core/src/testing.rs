//! Fakes of the collaborator traits, shared by the tests of this crate.

use std::{collections::VecDeque, sync::Arc, time::Duration};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    BackendError, ChatId, Config, MediaType, Notifier, PlaybackController, QueueItem,
    ResolveError, Resolver, StreamBackend,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Join(ChatId, String),
    Change(ChatId, String),
    Leave(ChatId),
    Pause(ChatId),
    Resume(ChatId),
    Mute(ChatId),
    Unmute(ChatId),
    Volume(ChatId, u32),
}

/// Records every call, and fails the ones it was told to fail.
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    failures: Mutex<VecDeque<(&'static str, BackendError)>>,
    change_delay: Mutex<Option<Duration>>,
}

impl FakeBackend {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Makes the next call of the given kind fail.
    pub fn fail_next(&self, kind: &'static str, error: BackendError) {
        self.failures.lock().push_back((kind, error));
    }

    pub fn delay_changes(&self, delay: Duration) {
        *self.change_delay.lock() = Some(delay);
    }

    fn record(&self, kind: &'static str, call: Call) -> Result<(), BackendError> {
        self.calls.lock().push(call);

        let mut failures = self.failures.lock();
        let position = failures.iter().position(|(k, _)| *k == kind);

        match position.and_then(|p| failures.remove(p)) {
            Some((_, error)) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StreamBackend for FakeBackend {
    async fn join_call(
        &self,
        chat_id: ChatId,
        source: &str,
        _media_type: MediaType,
        _quality: u32,
    ) -> Result<(), BackendError> {
        self.record("join", Call::Join(chat_id, source.to_string()))
    }

    async fn change_stream(
        &self,
        chat_id: ChatId,
        source: &str,
        _media_type: MediaType,
        _quality: u32,
    ) -> Result<(), BackendError> {
        let delay = *self.change_delay.lock();

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.record("change", Call::Change(chat_id, source.to_string()))
    }

    async fn leave_call(&self, chat_id: ChatId) -> Result<(), BackendError> {
        self.record("leave", Call::Leave(chat_id))
    }

    async fn pause(&self, chat_id: ChatId) -> Result<(), BackendError> {
        self.record("pause", Call::Pause(chat_id))
    }

    async fn resume(&self, chat_id: ChatId) -> Result<(), BackendError> {
        self.record("resume", Call::Resume(chat_id))
    }

    async fn mute(&self, chat_id: ChatId) -> Result<(), BackendError> {
        self.record("mute", Call::Mute(chat_id))
    }

    async fn unmute(&self, chat_id: ChatId) -> Result<(), BackendError> {
        self.record("unmute", Call::Unmute(chat_id))
    }

    async fn set_volume(&self, chat_id: ChatId, percent: u32) -> Result<(), BackendError> {
        self.record("volume", Call::Volume(chat_id, percent))
    }
}

/// Resolves every query to `stream://{query}`, or fails if told to.
#[derive(Default)]
pub struct FakeResolver {
    pub failure: Mutex<Option<ResolveError>>,
    pub delay: Mutex<Option<Duration>>,
}

#[async_trait]
impl Resolver for FakeResolver {
    async fn resolve(
        &self,
        query: &str,
        _media_type: MediaType,
        _quality: u32,
    ) -> Result<String, ResolveError> {
        let delay = *self.delay.lock();

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.failure.lock().clone() {
            Some(error) => Err(error),
            None => Ok(format!("stream://{}", query)),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(ChatId, String)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, chat_id: ChatId, text: &str) {
        self.sent.lock().push((chat_id, text.to_string()));
    }
}

pub struct Harness {
    pub controller: Arc<PlaybackController>,
    pub backend: Arc<FakeBackend>,
    pub resolver: Arc<FakeResolver>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config {
            resolve_timeout: Duration::from_millis(200),
            max_flood_wait: Duration::from_millis(5),
            ..Default::default()
        })
    }

    pub fn with_config(config: Config) -> Self {
        let backend = Arc::new(FakeBackend::default());
        let resolver = Arc::new(FakeResolver::default());
        let controller = Arc::new(PlaybackController::new(
            config,
            backend.clone(),
            resolver.clone(),
        ));

        Self {
            controller,
            backend,
            resolver,
        }
    }

    /// Requests each title in order, panicking if any request fails.
    pub async fn request_all(&self, chat_id: ChatId, titles: &[&str]) {
        for title in titles {
            self.controller
                .request(chat_id, item(title))
                .await
                .expect("request succeeds");
        }
    }

    pub fn titles(&self, chat_id: ChatId) -> Vec<String> {
        self.controller
            .queue(chat_id)
            .into_iter()
            .map(|i| i.title)
            .collect()
    }
}

pub fn item(title: &str) -> QueueItem {
    QueueItem::new(title, title)
}
