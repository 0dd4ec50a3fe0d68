//! Discord REST client (reqwest).

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    multipart::{Form, Part},
    Method, RequestBuilder, Response,
};
use serde::de::DeserializeOwned;
use serde_json::json;

use roster_core::{
    config::Config, domain::Snowflake, errors::Error, export::ExportFile, Result,
};

use crate::models::{ApiMember, ApiRole, CommandDescriptor, InteractionResponse};

const USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/guild-roster-bot, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

#[derive(Clone)]
pub struct DiscordHttp {
    client: reqwest::Client,
    base: String,
}

impl DiscordHttp {
    pub fn new(cfg: &Config) -> Result<Self> {
        Self::with_base(&cfg.discord_token, &cfg.api_base, cfg.http_timeout)
    }

    pub fn with_base(token: &str, base: &str, timeout: std::time::Duration) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bot {token}"))
            .map_err(|e| Error::Config(format!("invalid DISCORD_TOKEN: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(Self::map_err)?;

        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    fn map_err(e: reqwest::Error) -> Error {
        Error::External(format!("discord http error: {e}"))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{path}", self.base))
    }

    /// Send and turn any non-2xx status into `Error::External` with the body attached.
    ///
    /// `route` only labels the error; interaction tokens are kept out of it.
    async fn send(&self, method: Method, route: &str, req: RequestBuilder) -> Result<Response> {
        let resp = req.send().await.map_err(Self::map_err)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(Error::External(format!(
            "discord {method} {route} failed: {status}: {body}"
        )))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        route: &str,
        req: RequestBuilder,
    ) -> Result<T> {
        let resp = self.send(method, route, req).await?;
        let bytes = resp.bytes().await.map_err(Self::map_err)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Bulk-overwrite the application's guild commands.
    pub async fn register_guild_commands(
        &self,
        application_id: Snowflake,
        guild_id: Snowflake,
        commands: &[CommandDescriptor],
    ) -> Result<()> {
        let path = format!("/applications/{application_id}/guilds/{guild_id}/commands");
        let req = self.request(Method::PUT, &path).json(commands);
        self.send(Method::PUT, &path, req).await?;
        Ok(())
    }

    pub async fn guild_members_page(
        &self,
        guild_id: Snowflake,
        after: Snowflake,
        limit: u16,
    ) -> Result<Vec<ApiMember>> {
        let path = format!("/guilds/{guild_id}/members");
        let req = self
            .request(Method::GET, &path)
            .query(&[("limit", limit.to_string()), ("after", after.to_string())]);
        self.send_json(Method::GET, &path, req).await
    }

    pub async fn guild_roles(&self, guild_id: Snowflake) -> Result<Vec<ApiRole>> {
        let path = format!("/guilds/{guild_id}/roles");
        let req = self.request(Method::GET, &path);
        self.send_json(Method::GET, &path, req).await
    }

    pub async fn create_interaction_response(
        &self,
        interaction_id: Snowflake,
        token: &str,
        response: &InteractionResponse,
    ) -> Result<()> {
        let path = format!("/interactions/{interaction_id}/{token}/callback");
        let route = format!("/interactions/{interaction_id}/:token/callback");
        let req = self.request(Method::POST, &path).json(response);
        self.send(Method::POST, &route, req).await?;
        Ok(())
    }

    /// Replace the deferred reply. With a file, the body is multipart
    /// (`payload_json` + `files[0]`).
    pub async fn edit_original_response(
        &self,
        application_id: Snowflake,
        token: &str,
        content: &str,
        file: Option<&ExportFile>,
    ) -> Result<()> {
        let path = format!("/webhooks/{application_id}/{token}/messages/@original");
        let route = format!("/webhooks/{application_id}/:token/messages/@original");
        let req = self.request(Method::PATCH, &path);

        let req = match file {
            None => req.json(&json!({ "content": content })),
            Some(file) => {
                let payload = json!({
                    "content": content,
                    "attachments": [{ "id": 0, "filename": file.file_name }],
                });
                let part = Part::bytes(file.content.clone())
                    .file_name(file.file_name.clone())
                    .mime_str("text/csv; charset=utf-8")
                    .map_err(Self::map_err)?;
                let form = Form::new()
                    .text("payload_json", payload.to_string())
                    .part("files[0]", part);
                req.multipart(form)
            }
        };

        self.send(Method::PATCH, &route, req).await?;
        Ok(())
    }
}
