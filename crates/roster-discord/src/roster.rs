use std::sync::Arc;

use async_trait::async_trait;

use roster_core::{
    domain::{RosterSnapshot, Snowflake},
    ports::SnapshotProvider,
    Result,
};

use crate::http::DiscordHttp;

/// Snapshot provider backed by the guild member / role REST endpoints.
pub struct DiscordRoster {
    http: Arc<DiscordHttp>,
    page_size: u16,
}

impl DiscordRoster {
    pub fn new(http: Arc<DiscordHttp>, page_size: u16) -> Self {
        Self {
            http,
            page_size: page_size.max(1),
        }
    }
}

#[async_trait]
impl SnapshotProvider for DiscordRoster {
    async fn fetch_roster(&self, guild_id: Snowflake) -> Result<RosterSnapshot> {
        let mut members = Vec::new();
        let mut after = Snowflake(0);
        loop {
            let page = self
                .http
                .guild_members_page(guild_id, after, self.page_size)
                .await?;
            let short_page = page.len() < usize::from(self.page_size);
            let cursor = after;

            for entry in page {
                match entry.into_member() {
                    Some(member) => {
                        after = after.max(member.id);
                        members.push(member);
                    }
                    None => tracing::warn!(guild_id = %guild_id, "skipping member entry without user"),
                }
            }

            // A full page that did not move the cursor would repeat forever.
            if short_page || after == cursor {
                break;
            }
        }

        let roles = self
            .http
            .guild_roles(guild_id)
            .await?
            .into_iter()
            .map(|r| r.into_role(guild_id))
            .collect::<Vec<_>>();

        tracing::debug!(
            guild_id = %guild_id,
            members = members.len(),
            roles = roles.len(),
            "fetched roster snapshot"
        );

        Ok(RosterSnapshot { members, roles })
    }
}
