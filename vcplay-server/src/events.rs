use axum::{extract::State, http::StatusCode, routing::post, Json};
use log::debug;
use vcplay_core::StreamEvent;

use crate::{errors::ServerResult, verify::VerifiedBridge, Router, ServerContext, ServerError};

/// Receives a lifecycle event from the call bridge and hands it to the stream event router.
async fn receive_event(
    _bridge: VerifiedBridge,
    State(context): State<ServerContext>,
    Json(event): Json<StreamEvent>,
) -> ServerResult<StatusCode> {
    debug!("Bridge reported {:?}", event);

    context
        .events
        .send(event)
        .map_err(|_| ServerError::EventsClosed)?;

    Ok(StatusCode::ACCEPTED)
}

pub fn router() -> Router {
    Router::new().route("/events", post(receive_event))
}
