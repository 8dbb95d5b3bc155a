use axum::{extract::State, http::StatusCode, routing::post, Json};
use log::debug;

use crate::{schemas::UpdateSchema, verify::VerifiedWebhook, Router, ServerContext};

/// Answers right away, the command runs in its own task and replies through the notifier.
async fn receive_update(
    _webhook: VerifiedWebhook,
    State(context): State<ServerContext>,
    Json(update): Json<UpdateSchema>,
) -> StatusCode {
    let update_id = update.update_id;

    let Some(message) = update.into_command_message() else {
        debug!("Ignoring update {}", update_id);
        return StatusCode::OK;
    };

    tokio::spawn(async move {
        let reply = context
            .collab
            .handle(message.chat_id, message.caller, &message.text)
            .await;

        if let Some(reply) = reply {
            context.notifier.notify(message.chat_id, &reply).await;
        }
    });

    StatusCode::OK
}

pub fn router() -> Router {
    Router::new().route("/updates", post(receive_update))
}
