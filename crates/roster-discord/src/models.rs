//! Discord REST / gateway wire types (the subset the bot reads or writes).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roster_core::domain::{Member, Role, Snowflake};

pub const INTERACTION_APPLICATION_COMMAND: u8 = 2;
pub const CALLBACK_DEFERRED_CHANNEL_MESSAGE: u8 = 5;
pub const COMMAND_CHAT_INPUT: u8 = 1;

#[derive(Clone, Debug, Deserialize)]
pub struct ApiUser {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub discriminator: Option<String>,
}

impl ApiUser {
    /// `name#1234` for legacy accounts, plain username otherwise.
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some(d) if !d.is_empty() && d != "0" => format!("{}#{d}", self.username),
            _ => self.username.clone(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApiMember {
    #[serde(default)]
    pub user: Option<ApiUser>,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
}

impl ApiMember {
    /// Convert to the core model. `None` when the entry carries no user object.
    pub fn into_member(self) -> Option<Member> {
        let user = self.user?;
        let display_name = self
            .nick
            .clone()
            .or_else(|| user.global_name.clone())
            .unwrap_or_else(|| user.username.clone());

        Some(Member {
            id: user.id,
            username: user.username,
            display_name,
            nickname: self.nick,
            joined_at: self.joined_at,
            role_ids: self.roles.into_iter().collect(),
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApiRole {
    pub id: Snowflake,
    pub name: String,
    pub position: i64,
}

impl ApiRole {
    /// The base role shares its id with the guild.
    pub fn into_role(self, guild_id: Snowflake) -> Role {
        Role {
            is_everyone: self.id == guild_id,
            id: self.id,
            name: self.name,
            position: self.position,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CommandData {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Interaction {
    pub id: Snowflake,
    pub application_id: Snowflake,
    #[serde(rename = "type")]
    pub kind: u8,
    pub token: String,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub data: Option<CommandData>,
    #[serde(default)]
    pub member: Option<ApiMember>,
    #[serde(default)]
    pub user: Option<ApiUser>,
}

impl Interaction {
    /// Name of the invoked slash command, if this is one.
    pub fn command_name(&self) -> Option<&str> {
        if self.kind != INTERACTION_APPLICATION_COMMAND {
            return None;
        }
        self.data.as_ref().map(|d| d.name.as_str())
    }

    /// Invoking user (guild interactions carry it inside `member`).
    pub fn invoker(&self) -> Option<&ApiUser> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Ready {
    pub user: ApiUser,
    pub session_id: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
}

impl InteractionResponse {
    pub fn deferred() -> Self {
        Self {
            kind: CALLBACK_DEFERRED_CHANNEL_MESSAGE,
        }
    }
}

/// Slash command registration body.
#[derive(Clone, Debug, Serialize)]
pub struct CommandDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: u8,
}

impl CommandDescriptor {
    pub fn chat_input(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: COMMAND_CHAT_INPUT,
        }
    }
}
