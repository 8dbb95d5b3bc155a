use std::sync::Arc;

use axum::extract::FromRef;
use vcplay_collab::Collab;
use vcplay_core::{EventSender, Notifier};

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub collab: Arc<Collab>,
    /// Where command replies are sent
    pub notifier: Arc<dyn Notifier>,
    /// Feeds the stream event router
    pub events: EventSender,
    /// When set, updates must carry it in the `X-Telegram-Bot-Api-Secret-Token` header
    #[from_ref(skip)]
    pub webhook_secret: Option<String>,
    /// When set, events must carry it in the `X-Vcplay-Bridge-Secret` header
    #[from_ref(skip)]
    pub bridge_secret: Option<String>,
}
