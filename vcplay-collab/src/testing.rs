//! Fakes shared by the tests of this crate.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use vcplay_core::{
    BackendError, ChatId, Config, MediaType, PlaybackController, ResolveError, Resolver,
    StreamBackend, UserId,
};

use crate::{
    ChatMember, Collab, CollabConfig, InputError, LookupError, PrivilegeLookup, Search,
    SearchResult,
};

pub const CHAT: ChatId = -100;
pub const SUPER_USER: UserId = 1;

/// An admin that can manage video chats.
pub fn member(user_id: UserId) -> ChatMember {
    ChatMember {
        user_id,
        is_deleted: false,
        is_owner: false,
        can_manage_video_chats: true,
    }
}

/// Answers every lookup with the same members, or the same error.
#[derive(Default)]
pub struct ScriptedLookup {
    members: Mutex<Vec<ChatMember>>,
    failure: Option<LookupError>,
    calls: AtomicUsize,
}

impl ScriptedLookup {
    pub fn with_members(members: Vec<ChatMember>) -> Self {
        Self {
            members: Mutex::new(members),
            ..Default::default()
        }
    }

    pub fn failing(error: LookupError) -> Self {
        Self {
            failure: Some(error),
            ..Default::default()
        }
    }

    pub fn set_members(&self, members: Vec<ChatMember>) {
        *self.members.lock() = members;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PrivilegeLookup for ScriptedLookup {
    async fn list_privileged(&self, _chat_id: ChatId) -> Result<Vec<ChatMember>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(self.members.lock().clone()),
        }
    }
}

/// Finds `https://found/{query}` titled `Result for {query}`, unless told to find nothing.
#[derive(Default)]
pub struct FakeSearch {
    pub empty: Mutex<bool>,
}

#[async_trait]
impl Search for FakeSearch {
    async fn search(&self, query: &str) -> Result<SearchResult, InputError> {
        if *self.empty.lock() {
            return Err(InputError::NotFound);
        }

        Ok(SearchResult {
            title: format!("Result for {}", query),
            url: format!("https://found/{}", query),
        })
    }
}

struct EchoResolver;

#[async_trait]
impl Resolver for EchoResolver {
    async fn resolve(
        &self,
        query: &str,
        _media_type: MediaType,
        _quality: u32,
    ) -> Result<String, ResolveError> {
        Ok(format!("stream://{}", query))
    }
}

/// Records every backend call as a short line, like `join stream://a`.
#[derive(Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<String>>,
}

impl RecordingBackend {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) -> Result<(), BackendError> {
        self.calls.lock().push(call);
        Ok(())
    }
}

#[async_trait]
impl StreamBackend for RecordingBackend {
    async fn join_call(
        &self,
        _chat_id: ChatId,
        source: &str,
        _media_type: MediaType,
        _quality: u32,
    ) -> Result<(), BackendError> {
        self.record(format!("join {}", source))
    }

    async fn change_stream(
        &self,
        _chat_id: ChatId,
        source: &str,
        _media_type: MediaType,
        _quality: u32,
    ) -> Result<(), BackendError> {
        self.record(format!("change {}", source))
    }

    async fn leave_call(&self, _chat_id: ChatId) -> Result<(), BackendError> {
        self.record("leave".to_string())
    }

    async fn pause(&self, _chat_id: ChatId) -> Result<(), BackendError> {
        self.record("pause".to_string())
    }

    async fn resume(&self, _chat_id: ChatId) -> Result<(), BackendError> {
        self.record("resume".to_string())
    }

    async fn mute(&self, _chat_id: ChatId) -> Result<(), BackendError> {
        self.record("mute".to_string())
    }

    async fn unmute(&self, _chat_id: ChatId) -> Result<(), BackendError> {
        self.record("unmute".to_string())
    }

    async fn set_volume(&self, _chat_id: ChatId, percent: u32) -> Result<(), BackendError> {
        self.record(format!("volume {}", percent))
    }
}

/// A [Collab] wired to fakes, with [SUPER_USER] configured.
pub struct Setup {
    pub collab: Collab,
    pub backend: Arc<RecordingBackend>,
    pub lookup: Arc<ScriptedLookup>,
    pub search: Arc<FakeSearch>,
}

impl Setup {
    pub fn new(admins: Vec<ChatMember>) -> Self {
        let backend = Arc::new(RecordingBackend::default());
        let lookup = Arc::new(ScriptedLookup::with_members(admins));
        let search = Arc::new(FakeSearch::default());

        let controller = Arc::new(PlaybackController::new(
            Config::default(),
            backend.clone(),
            Arc::new(EchoResolver),
        ));

        let config = CollabConfig {
            super_users: [SUPER_USER].into_iter().collect(),
            ..Default::default()
        };

        Self {
            collab: Collab::new(config, controller, lookup.clone(), search.clone()),
            backend,
            lookup,
            search,
        }
    }

    /// Sends a message to [CHAT], panicking if it gets no reply.
    pub async fn send(&self, caller: UserId, text: &str) -> String {
        self.collab
            .handle(CHAT, caller, text)
            .await
            .expect("the command is answered")
    }
}
