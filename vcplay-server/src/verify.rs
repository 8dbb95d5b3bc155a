use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{errors::ServerError, ServerContext};

/// The header Telegram puts the webhook secret in
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// The header the call bridge puts its shared secret in
pub const BRIDGE_SECRET_HEADER: &str = "x-vcplay-bridge-secret";

/// Proves an update came from Telegram, when a webhook secret is configured.
pub struct VerifiedWebhook;

/// Proves an event came from the call bridge, when a bridge secret is configured.
pub struct VerifiedBridge;

#[async_trait]
impl FromRequestParts<ServerContext> for VerifiedWebhook {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        check_header(parts, SECRET_HEADER, state.webhook_secret.as_deref()).map(|_| Self)
    }
}

#[async_trait]
impl FromRequestParts<ServerContext> for VerifiedBridge {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        check_header(parts, BRIDGE_SECRET_HEADER, state.bridge_secret.as_deref()).map(|_| Self)
    }
}

fn check_header(parts: &Parts, header: &str, expected: Option<&str>) -> Result<(), ServerError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let given = parts.headers.get(header).and_then(|x| x.to_str().ok());

    if given == Some(expected) {
        Ok(())
    } else {
        Err(ServerError::InvalidSecret)
    }
}
