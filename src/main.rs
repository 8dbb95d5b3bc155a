use std::{env, sync::Arc};

use colored::Colorize;
use log::{error, info, warn};
use thiserror::Error;
use tokio::runtime::{self, Runtime};
use vcplay_collab::{Collab, CollabConfig, YtDlpResolver};
use vcplay_core::{
    event_channel, BackendError, Config, EventReceiver, PlaybackController, StreamEventRouter,
};
use vcplay_impls::{BridgeBackend, TelegramClient, TelegramError};
use vcplay_server::{
    bridge_secret_from_env, port_from_env, run_server, webhook_secret_from_env, ServerContext,
    ServerError, BRIDGE_SECRET_VAR,
};

mod logging;

const BOT_TOKEN_VAR: &str = "VCPLAY_BOT_TOKEN";

pub struct Vcplay {
    runtime: Runtime,
    port: u16,
    controller: Arc<PlaybackController>,
    router: Arc<StreamEventRouter>,
    receiver: EventReceiver,
    context: ServerContext,
}

#[derive(Debug, Error)]
enum VcplayError {
    #[error("{0} is not set")]
    MissingVariable(&'static str),

    #[error("Could not reach Telegram: {0}")]
    Telegram(#[from] TelegramError),

    #[error("The call bridge at {url} is unavailable: {error}")]
    Bridge { url: String, error: BackendError },

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("Fatal error: {0}")]
    Fatal(String),
}

impl Vcplay {
    fn new() -> Result<Self, VcplayError> {
        info!("Building async runtime...");
        let runtime = runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("vcplay-async")
            .build()
            .map_err(|e| VcplayError::Fatal(e.to_string()))?;

        let token = env::var(BOT_TOKEN_VAR)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(VcplayError::MissingVariable(BOT_TOKEN_VAR))?;

        let config = Config::from_env();
        let mut collab_config = CollabConfig::from_env();

        info!("Connecting to Telegram...");
        let telegram = Arc::new(TelegramClient::new(token.trim()));
        let me = runtime.block_on(telegram.get_me())?;

        if collab_config.bot_username.is_none() {
            collab_config.bot_username = me.username.clone();
        }

        info!(
            "Running as @{}",
            me.username.as_deref().unwrap_or(&me.first_name)
        );

        let bridge = Arc::new(BridgeBackend::from_env());
        info!("Checking the call bridge at {}...", bridge.base_url());

        runtime
            .block_on(bridge.health())
            .map_err(|error| VcplayError::Bridge {
                url: bridge.base_url().to_string(),
                error,
            })?;

        if collab_config.super_users.is_empty() {
            warn!("No super users are configured, only chat admins can control playback");
        }

        let resolver = Arc::new(YtDlpResolver::new());
        let controller = Arc::new(PlaybackController::new(
            config,
            bridge,
            resolver.clone(),
        ));

        let collab = Collab::new(collab_config, controller.clone(), telegram.clone(), resolver);

        let (events, receiver) = event_channel();
        let router = Arc::new(StreamEventRouter::new(controller.clone(), telegram.clone()));

        let bridge_secret = bridge_secret_from_env();

        if bridge_secret.is_none() {
            warn!(
                "{} is not set, anyone who can reach the server can post stream events",
                BRIDGE_SECRET_VAR
            );
        }

        let context = ServerContext {
            collab: Arc::new(collab),
            notifier: telegram,
            events,
            webhook_secret: webhook_secret_from_env(),
            bridge_secret,
        };

        Ok(Self {
            runtime,
            port: port_from_env(),
            controller,
            router,
            receiver,
            context,
        })
    }

    /// Serves until the server fails or the process is interrupted, then leaves every call.
    fn run(self) -> Result<(), VcplayError> {
        let Self {
            runtime,
            port,
            controller,
            router,
            receiver,
            context,
        } = self;

        runtime.block_on(async move {
            tokio::spawn(router.run(receiver));

            let result = tokio::select! {
                result = run_server(context, port) => result.map_err(VcplayError::from),
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, shutting down...");
                    Ok(())
                }
            };

            controller.stop_all().await;
            info!("Left every call");

            result
        })
    }
}

impl VcplayError {
    fn hint(&self) -> String {
        match self {
            VcplayError::MissingVariable(name) => format!("Set {} in the environment and try again.", name),
            VcplayError::Telegram(_) => "Make sure the bot token is valid and that Telegram is reachable from this machine.".to_string(),
            VcplayError::Bridge { .. } => format!("Make sure the call bridge is running, or point {} at it.", BridgeBackend::URL_VAR),
            VcplayError::Server(ServerError::Bind { .. }) => format!("Another process may be using the port. Pick another with {}.", vcplay_server::PORT_VAR),
            VcplayError::Server(_) => "The server stopped unexpectedly.".to_string(),
            VcplayError::Fatal(_) => "This error is fatal, and should not happen.".to_string(),
        }
    }
}

fn main() {
    logging::init_logger();

    let result = Vcplay::new().and_then(|vcplay| {
        info!("Initialized successfully.");
        vcplay.run()
    });

    if let Err(error) = result {
        error!("{} Read the error below to troubleshoot the issue.", "vcplay stopped!".bold().red());
        error!("{}", error);
        error!("{}", format!("Hint: {}", error.hint()).dimmed().italic());

        std::process::exit(1);
    }
}
