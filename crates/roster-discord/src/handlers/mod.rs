//! Interaction handlers.
//!
//! Only the export slash command is handled; every other interaction is ignored.

use std::sync::Arc;

use crate::{models::Interaction, router::AppState};

mod export;

pub use export::command_descriptor;

/// True when `interaction` invokes the configured export command.
pub fn is_export_command(interaction: &Interaction, command_name: &str) -> bool {
    interaction.command_name() == Some(command_name)
}

pub async fn handle_interaction(state: Arc<AppState>, interaction: Interaction) {
    if !is_export_command(&interaction, &state.cfg.command_name) {
        return;
    }
    export::handle_export(state, interaction).await;
}
