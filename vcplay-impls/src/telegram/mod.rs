mod types;

pub use types::{Administrator, User};

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use thiserror::Error;
use vcplay_collab::{ChatMember, LookupError, PrivilegeLookup};
use vcplay_core::{ChatId, Notifier};

use types::ApiResponse;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TelegramError {
    #[error("Telegram answered {code}: {description}")]
    Api { code: u16, description: String },

    #[error("Telegram is rate limiting us, retry after {0}s")]
    Flood(u64),

    #[error("Failed to reach Telegram: {0}")]
    Transport(String),

    #[error("Failed to parse Telegram's answer: {0}")]
    Parse(String),
}

/// A minimal Bot API client, covering what vcplay needs.
pub struct TelegramClient {
    client: Client,
    /// The API url including the bot token
    base_url: String,
}

impl TelegramClient {
    pub const API_URL: &'static str = "https://api.telegram.org";

    pub fn new(token: &str) -> Self {
        Self::with_api_url(Self::API_URL, token)
    }

    /// Talks to a different Bot API server, like a self-hosted one.
    pub fn with_api_url(api_url: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        }
    }

    /// Returns the bot's own user, which also proves the token is valid.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &json!({})).await
    }

    pub async fn get_chat_administrators(
        &self,
        chat_id: ChatId,
    ) -> Result<Vec<Administrator>, TelegramError> {
        self.call("getChatAdministrators", &json!({ "chat_id": chat_id }))
            .await
    }

    pub async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), TelegramError> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                &json!({ "chat_id": chat_id, "text": text }),
            )
            .await?;

        Ok(())
    }

    async fn call<P, T>(&self, method: &str, params: &P) -> Result<T, TelegramError>
    where
        P: Serialize + Sync,
        T: DeserializeOwned,
    {
        debug!("Calling {}", method);

        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(params)
            .send()
            .await
            .map_err(|e| TelegramError::Transport(e.to_string()))?;

        let status = response.status();
        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TelegramError::Parse(e.to_string()))?;

        if body.ok {
            return body
                .result
                .ok_or_else(|| TelegramError::Parse(format!("{} returned no result", method)));
        }

        if let Some(retry_after) = body.parameters.and_then(|p| p.retry_after) {
            return Err(TelegramError::Flood(retry_after));
        }

        Err(TelegramError::Api {
            code: body.error_code.unwrap_or(status.as_u16()),
            description: body.description.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl PrivilegeLookup for TelegramClient {
    async fn list_privileged(&self, chat_id: ChatId) -> Result<Vec<ChatMember>, LookupError> {
        let administrators = self
            .get_chat_administrators(chat_id)
            .await
            .map_err(|e| LookupError::Unavailable(e.to_string()))?;

        Ok(administrators.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn notify(&self, chat_id: ChatId, text: &str) {
        if let Err(err) = self.send_message(chat_id, text).await {
            warn!("Failed to send a message to chat {}: {}", chat_id, err);
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::{
        extract::{Path, State},
        routing::post,
        Json, Router,
    };
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use tokio::net::TcpListener;
    use vcplay_collab::{ChatMember, LookupError, PrivilegeLookup};
    use vcplay_core::Notifier;

    use super::{TelegramClient, TelegramError};

    type Seen = Arc<Mutex<Vec<(String, Value)>>>;

    async fn api(
        State(seen): State<Seen>,
        Path(method): Path<String>,
        Json(params): Json<Value>,
    ) -> Json<Value> {
        seen.lock().push((method.clone(), params.clone()));

        let answer = match method.as_str() {
            "getMe" => json!({"ok": true, "result": {"id": 10, "is_bot": true, "first_name": "vcplay", "username": "VcPlayBot"}}),
            "getChatAdministrators" if params["chat_id"] == json!(-1) => json!({
                "ok": false, "error_code": 400, "description": "Bad Request: chat not found"
            }),
            "getChatAdministrators" => json!({"ok": true, "result": [
                {"status": "creator", "user": {"id": 1, "is_bot": false, "first_name": "Owner"}},
                {"status": "administrator", "user": {"id": 2, "is_bot": false, "first_name": "Admin"}, "can_manage_video_chats": true},
                {"status": "administrator", "user": {"id": 3, "is_bot": false, "first_name": ""}, "can_manage_video_chats": true},
                {"status": "administrator", "user": {"id": 4, "is_bot": false, "first_name": "Mod"}, "can_manage_video_chats": false}
            ]}),
            "sendMessage" => json!({
                "ok": false, "error_code": 429, "description": "Too Many Requests", "parameters": {"retry_after": 3}
            }),
            _ => json!({"ok": false, "error_code": 404, "description": "Not Found"}),
        };

        Json(answer)
    }

    async fn spawn_api() -> (TelegramClient, Seen) {
        let seen = Seen::default();
        let router = Router::new()
            .route("/botTOKEN/:method", post(api))
            .with_state(seen.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = TelegramClient::with_api_url(&format!("http://{}", addr), "TOKEN");
        (client, seen)
    }

    #[tokio::test]
    async fn get_me() {
        let (client, _) = spawn_api().await;
        let me = client.get_me().await.unwrap();

        assert_eq!(me.id, 10);
        assert_eq!(me.username.as_deref(), Some("VcPlayBot"));
    }

    #[tokio::test]
    async fn administrators_become_chat_members() {
        let (client, _) = spawn_api().await;
        let members = client.list_privileged(-100).await.unwrap();

        let privileged: Vec<_> = members
            .iter()
            .filter(|m| m.is_privileged())
            .map(|m| m.user_id)
            .collect();

        assert_eq!(privileged, vec![1, 2]);
        assert_eq!(
            members[2],
            ChatMember {
                user_id: 3,
                is_deleted: true,
                is_owner: false,
                can_manage_video_chats: true,
            }
        );
    }

    #[tokio::test]
    async fn api_errors_make_the_lookup_unavailable() {
        let (client, _) = spawn_api().await;

        assert_eq!(
            client.list_privileged(-1).await,
            Err(LookupError::Unavailable(
                "Telegram answered 400: Bad Request: chat not found".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn flood_is_reported_and_notify_swallows_it() {
        let (client, seen) = spawn_api().await;

        assert_eq!(
            client.send_message(5, "hi").await,
            Err(TelegramError::Flood(3))
        );

        client.notify(5, "hello").await;

        let seen = seen.lock().clone();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].1, json!({"chat_id": 5, "text": "hello"}));
    }
}
