use std::sync::Arc;

use crate::{
    models::{CommandDescriptor, Interaction, InteractionResponse},
    router::AppState,
    InteractionSink,
};

pub const COMMAND_DESCRIPTION: &str = "サーバーのメンバー情報をCSVで取得します";

/// Registration body for the export command.
pub fn command_descriptor(name: &str) -> CommandDescriptor {
    CommandDescriptor::chat_input(name, COMMAND_DESCRIPTION)
}

/// Defer the reply, export the configured guild, and edit the reply with the CSV.
pub async fn handle_export(state: Arc<AppState>, interaction: Interaction) {
    let invoker = interaction
        .invoker()
        .map(|u| u.tag())
        .unwrap_or_else(|| "unknown".to_string());
    tracing::info!(
        interaction_id = %interaction.id,
        invoker = %invoker,
        guild_id = %state.cfg.guild_id,
        "roster export requested"
    );

    if let Err(e) = state
        .http
        .create_interaction_response(
            interaction.id,
            &interaction.token,
            &InteractionResponse::deferred(),
        )
        .await
    {
        tracing::error!(interaction_id = %interaction.id, error = %e, "failed to defer reply");
        return;
    }

    let sink = InteractionSink::new(
        state.http.clone(),
        interaction.application_id,
        interaction.token.clone(),
    );
    // Failures are logged and reported to the requester by the exporter.
    if state
        .exporter
        .export_and_deliver(state.cfg.guild_id, &sink)
        .await
        .is_ok()
    {
        tracing::info!(interaction_id = %interaction.id, "roster export delivered");
    }
}
