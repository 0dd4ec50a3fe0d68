use async_trait::async_trait;

use crate::{
    domain::{RosterSnapshot, Snowflake},
    export::ExportFile,
    Result,
};

/// Hexagonal port for fetching a guild's members + roles.
///
/// Implementations return a complete snapshot (any paging happens inside the
/// adapter). Freshness is whatever the platform reports at fetch time.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn fetch_roster(&self, guild_id: Snowflake) -> Result<RosterSnapshot>;
}

/// Hexagonal port for handing an export back to whoever asked for it.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn deliver(&self, file: &ExportFile) -> Result<()>;

    /// Tell the requester the export failed. No partial output is sent.
    async fn report_failure(&self) -> Result<()>;
}
