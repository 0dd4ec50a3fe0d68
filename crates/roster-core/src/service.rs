use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    domain::Snowflake,
    export::{encode, project, ExportFile},
    ports::{DeliverySink, SnapshotProvider},
    Result,
};

/// Runs one roster export: snapshot, projection, encoding, hand-off.
///
/// Holds no per-export state; concurrent exports are independent.
#[derive(Clone)]
pub struct RosterExporter {
    provider: Arc<dyn SnapshotProvider>,
}

impl RosterExporter {
    pub fn new(provider: Arc<dyn SnapshotProvider>) -> Self {
        Self { provider }
    }

    pub async fn export(&self, guild_id: Snowflake, now: DateTime<Utc>) -> Result<ExportFile> {
        let snapshot = self.provider.fetch_roster(guild_id).await?;
        let table = project(&snapshot.members, &snapshot.roles);
        let file = encode(&table, now)?;

        tracing::info!(
            guild_id = %guild_id,
            members = snapshot.members.len(),
            role_columns = table.role_columns(),
            file_name = %file.file_name,
            bytes = file.content.len(),
            "roster export encoded"
        );
        Ok(file)
    }

    /// Export and deliver, or report a single failure notice to `sink`.
    ///
    /// Snapshot, encoding, and delivery failures all end in one notice. The
    /// original error is returned even when the notice is sent.
    pub async fn export_and_deliver(
        &self,
        guild_id: Snowflake,
        sink: &dyn DeliverySink,
    ) -> Result<()> {
        let outcome = match self.export(guild_id, Utc::now()).await {
            Ok(file) => sink.deliver(&file).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            tracing::error!(guild_id = %guild_id, error = %e, "roster export failed");
            if let Err(notice_err) = sink.report_failure().await {
                tracing::warn!(error = %notice_err, "failed to send export failure notice");
            }
        }
        outcome
    }
}
