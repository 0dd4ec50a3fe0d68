//! Discord adapter (REST via reqwest, gateway via tokio-tungstenite).
//!
//! This crate implements the `roster-core` ports over the Discord API.

use std::sync::Arc;

use async_trait::async_trait;

use roster_core::{
    domain::Snowflake, export::ExportFile, ports::DeliverySink, Result,
};

pub mod gateway;
pub mod handlers;
pub mod http;
pub mod models;
pub mod roster;
pub mod router;

use crate::http::DiscordHttp;

pub const EXPORT_DONE_MESSAGE: &str = "📄 メンバー情報をCSV形式で出力しました";
pub const EXPORT_FAILED_MESSAGE: &str = "⚠️ エクスポート中にエラーが発生しました。";

/// Delivers an export by editing a deferred interaction reply.
#[derive(Clone)]
pub struct InteractionSink {
    http: Arc<DiscordHttp>,
    application_id: Snowflake,
    token: String,
}

impl InteractionSink {
    pub fn new(http: Arc<DiscordHttp>, application_id: Snowflake, token: impl Into<String>) -> Self {
        Self {
            http,
            application_id,
            token: token.into(),
        }
    }
}

#[async_trait]
impl DeliverySink for InteractionSink {
    async fn deliver(&self, file: &ExportFile) -> Result<()> {
        self.http
            .edit_original_response(
                self.application_id,
                &self.token,
                EXPORT_DONE_MESSAGE,
                Some(file),
            )
            .await
    }

    async fn report_failure(&self) -> Result<()> {
        self.http
            .edit_original_response(self.application_id, &self.token, EXPORT_FAILED_MESSAGE, None)
            .await
    }
}
