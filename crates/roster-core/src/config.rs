use std::{env, time::Duration};

use crate::{domain::Snowflake, errors::Error, Result};

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";
pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";
pub const DEFAULT_COMMAND_NAME: &str = "server";

/// Discord caps `GET /guilds/{id}/members` at 1000 entries per page.
pub const MAX_MEMBER_PAGE_SIZE: u16 = 1000;

/// Typed configuration for the bot.
#[derive(Clone, Debug)]
pub struct Config {
    // Credentials / targets
    pub discord_token: String,
    pub application_id: Snowflake,
    pub guild_id: Snowflake,

    // Endpoints
    pub api_base: String,
    pub gateway_url: String,

    // Command
    pub command_name: String,

    // Runtime constants
    pub member_page_size: u16,
    pub http_timeout: Duration,
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    ///
    /// Variables already set in the environment win over `.env` entries.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        // Required
        let discord_token = get("DISCORD_TOKEN").ok_or_else(|| {
            Error::Config("DISCORD_TOKEN environment variable is required".to_string())
        })?;
        let application_id = required_snowflake(get("DISCORD_CLIENT_ID"), "DISCORD_CLIENT_ID")?;
        let guild_id = required_snowflake(get("DISCORD_GUILD_ID"), "DISCORD_GUILD_ID")?;

        // Endpoints
        let api_base = get("DISCORD_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        let gateway_url =
            get("DISCORD_GATEWAY_URL").unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());

        let command_name = get("EXPORT_COMMAND_NAME")
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_else(|| DEFAULT_COMMAND_NAME.to_string());

        let member_page_size = get("MEMBER_PAGE_SIZE")
            .and_then(|s| s.trim().parse::<u16>().ok())
            .unwrap_or(MAX_MEMBER_PAGE_SIZE)
            .clamp(1, MAX_MEMBER_PAGE_SIZE);
        let http_timeout = Duration::from_secs(
            get("HTTP_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(30),
        );

        Ok(Self {
            discord_token,
            application_id,
            guild_id,
            api_base,
            gateway_url,
            command_name,
            member_page_size,
            http_timeout,
        })
    }
}

fn required_snowflake(value: Option<String>, key: &str) -> Result<Snowflake> {
    let Some(raw) = value else {
        return Err(Error::Config(format!(
            "{key} environment variable is required"
        )));
    };
    raw.parse::<Snowflake>()
        .map_err(|e| Error::Config(format!("{key} must be a numeric id ({raw:?}): {e}")))
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
