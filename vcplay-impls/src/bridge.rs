use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{header::RETRY_AFTER, Client, Response, StatusCode};
use serde::Serialize;
use vcplay_core::{BackendError, ChatId, MediaType, StreamBackend};

/// Used when a flood response doesn't say how long to wait
const DEFAULT_FLOOD_WAIT: Duration = Duration::from_secs(1);

/// Streams into calls through the call-bridge sidecar, which owns the user account that joins the calls.
///
/// Every operation is a `POST /calls/{chat_id}/{action}` with a JSON body.
/// The bridge reports lifecycle events back through the server's event endpoint.
pub struct BridgeBackend {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct StreamRequest<'a> {
    source: &'a str,
    kind: &'static str,
    quality: u32,
}

#[derive(Debug, Serialize)]
struct VolumeRequest {
    percent: u32,
}

#[derive(Debug, Serialize)]
struct Empty {}

impl BridgeBackend {
    pub const DEFAULT_URL: &'static str = "http://127.0.0.1:8700";
    pub const URL_VAR: &'static str = "VCPLAY_BRIDGE_URL";

    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn from_env() -> Self {
        let base_url = std::env::var(Self::URL_VAR)
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_URL.to_string());

        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Checks that the bridge is up and answering.
    pub async fn health(&self) -> Result<(), BackendError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        check(response).await
    }

    async fn post<B>(&self, chat_id: ChatId, action: &str, body: &B) -> Result<(), BackendError>
    where
        B: Serialize + Sync,
    {
        let url = format!("{}/calls/{}/{}", self.base_url, chat_id, action);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let result = check(response).await;

        if let Err(err) = &result {
            warn!("Bridge {} in chat {} failed: {}", action, chat_id, err);
        }

        result
    }
}

#[async_trait]
impl StreamBackend for BridgeBackend {
    async fn join_call(
        &self,
        chat_id: ChatId,
        source: &str,
        media_type: MediaType,
        quality: u32,
    ) -> Result<(), BackendError> {
        let body = StreamRequest {
            source,
            kind: kind(media_type),
            quality,
        };

        self.post(chat_id, "join", &body).await
    }

    async fn change_stream(
        &self,
        chat_id: ChatId,
        source: &str,
        media_type: MediaType,
        quality: u32,
    ) -> Result<(), BackendError> {
        let body = StreamRequest {
            source,
            kind: kind(media_type),
            quality,
        };

        self.post(chat_id, "stream", &body).await
    }

    async fn leave_call(&self, chat_id: ChatId) -> Result<(), BackendError> {
        self.post(chat_id, "leave", &Empty {}).await
    }

    async fn pause(&self, chat_id: ChatId) -> Result<(), BackendError> {
        self.post(chat_id, "pause", &Empty {}).await
    }

    async fn resume(&self, chat_id: ChatId) -> Result<(), BackendError> {
        self.post(chat_id, "resume", &Empty {}).await
    }

    async fn mute(&self, chat_id: ChatId) -> Result<(), BackendError> {
        self.post(chat_id, "mute", &Empty {}).await
    }

    async fn unmute(&self, chat_id: ChatId) -> Result<(), BackendError> {
        self.post(chat_id, "unmute", &Empty {}).await
    }

    async fn set_volume(&self, chat_id: ChatId, percent: u32) -> Result<(), BackendError> {
        self.post(chat_id, "volume", &VolumeRequest { percent }).await
    }
}

fn kind(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Audio => "audio",
        MediaType::Video => "video",
    }
}

/// Maps a bridge response to the outcome of the operation.
async fn check(response: Response) -> Result<(), BackendError> {
    let status = response.status();

    if status.is_success() {
        return Ok(());
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_FLOOD_WAIT);

        return Err(BackendError::Flood { retry_after });
    }

    let body = response.text().await.unwrap_or_default();
    let body = body.trim();

    if body.is_empty() {
        Err(BackendError::Rejected(status.to_string()))
    } else {
        Err(BackendError::Rejected(format!("{}: {}", status, body)))
    }
}
