//! The webhook server of vcplay. Telegram posts chat updates to it, and the
//! call bridge posts stream lifecycle events.

mod context;
mod errors;
mod events;
mod schemas;
mod updates;
mod verify;

pub use context::*;
pub use errors::*;
pub use verify::{BRIDGE_SECRET_HEADER, SECRET_HEADER};

use axum::{routing::get, Json};
use log::info;
use serde_json::{json, Value};
use std::net::{Ipv6Addr, SocketAddr};
use tokio::net::TcpListener;
use vcplay_core::env_parse;

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 9060;
pub const PORT_VAR: &str = "VCPLAY_SERVER_PORT";
pub const WEBHOOK_SECRET_VAR: &str = "VCPLAY_WEBHOOK_SECRET";
pub const BRIDGE_SECRET_VAR: &str = "VCPLAY_BRIDGE_SECRET";

pub type Router = axum::Router<ServerContext>;

/// Returns the configured port, or [DEFAULT_PORT].
pub fn port_from_env() -> u16 {
    env_parse(PORT_VAR).unwrap_or(DEFAULT_PORT)
}

pub fn webhook_secret_from_env() -> Option<String> {
    env_parse::<String>(WEBHOOK_SECRET_VAR).filter(|s| !s.is_empty())
}

pub fn bridge_secret_from_env() -> Option<String> {
    env_parse::<String>(BRIDGE_SECRET_VAR).filter(|s| !s.is_empty())
}

/// Builds the routes of the server.
pub fn app(context: ServerContext) -> axum::Router {
    let version_one_router = Router::new()
        .merge(updates::router())
        .merge(events::router())
        .route("/health", get(health));

    axum::Router::new()
        .nest("/v1", version_one_router)
        .with_state(context)
}

/// Starts the vcplay server, running until it fails.
pub async fn run_server(context: ServerContext, port: u16) -> ServerResult<()> {
    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ServerError::Bind {
            port,
            reason: e.to_string(),
        })?;

    info!("Listening on {}", addr);

    axum::serve(listener, app(context))
        .await
        .map_err(|e| ServerError::Unknown(e.to_string()))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
