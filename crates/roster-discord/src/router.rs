use std::sync::Arc;

use tokio::sync::mpsc;

use roster_core::{config::Config, service::RosterExporter};

use crate::{
    gateway::{run_gateway, GatewayEvent, IdentifyPayload},
    handlers,
    http::DiscordHttp,
    roster::DiscordRoster,
};

const EVENT_BUFFER: usize = 64;

/// Shared, read-only state handed to every interaction handler.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub http: Arc<DiscordHttp>,
    pub exporter: Arc<RosterExporter>,
}

impl AppState {
    pub fn new(cfg: Arc<Config>) -> roster_core::Result<Self> {
        let http = Arc::new(DiscordHttp::new(&cfg)?);
        let roster = Arc::new(DiscordRoster::new(http.clone(), cfg.member_page_size));
        Ok(Self {
            cfg,
            http,
            exporter: Arc::new(RosterExporter::new(roster)),
        })
    }
}

/// Register the export command for the configured guild.
pub async fn register_commands(state: &AppState) -> roster_core::Result<()> {
    let command = handlers::command_descriptor(&state.cfg.command_name);
    state
        .http
        .register_guild_commands(
            state.cfg.application_id,
            state.cfg.guild_id,
            std::slice::from_ref(&command),
        )
        .await
}

/// Register the command, connect to the gateway, and serve interactions until
/// the gateway fails fatally.
pub async fn run(cfg: Arc<Config>) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(cfg.clone())?);
    tracing::info!(
        application_id = %cfg.application_id,
        guild_id = %cfg.guild_id,
        "starting roster bot"
    );

    // Registration failure is not fatal: a previously registered command still works.
    tracing::info!(command = %cfg.command_name, "registering slash command");
    match register_commands(&state).await {
        Ok(()) => tracing::info!(command = %cfg.command_name, "slash command registered"),
        Err(e) => tracing::error!(error = %e, "slash command registration failed"),
    }

    let (tx, mut rx) = mpsc::channel::<GatewayEvent>(EVENT_BUFFER);
    let identify = IdentifyPayload::for_roster_export(cfg.discord_token.clone());
    let gateway_url = cfg.gateway_url.clone();
    let mut gateway = tokio::spawn(async move { run_gateway(&gateway_url, identify, tx).await });

    loop {
        tokio::select! {
            joined = &mut gateway => {
                return match joined {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(anyhow::anyhow!("gateway stopped: {e}")),
                    Err(e) => Err(anyhow::anyhow!("gateway task failed: {e}")),
                };
            }
            Some(event) = rx.recv() => dispatch(&state, event),
        }
    }
}

fn dispatch(state: &Arc<AppState>, event: GatewayEvent) {
    match event {
        GatewayEvent::Ready(ready) => {
            tracing::info!(session_id = %ready.session_id, "Bot started: {}", ready.user.tag());
        }
        GatewayEvent::InteractionCreate(interaction) => {
            let state = state.clone();
            tokio::spawn(async move { handlers::handle_interaction(state, *interaction).await });
        }
    }
}
