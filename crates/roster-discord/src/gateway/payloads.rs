//! Gateway envelope and the payloads the bot sends or reads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::OpCode;

/// Gateway envelope: `{op, d, s, t}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMessage {
    pub op: OpCode,

    /// Event payload (`null` for some ops).
    #[serde(default)]
    pub d: Option<Value>,

    /// Sequence number (Dispatch only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event name (Dispatch only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayMessage {
    /// Heartbeat (op=1) carrying the last sequence number seen, or `null`.
    #[must_use]
    pub fn heartbeat(last_sequence: Option<u64>) -> Self {
        Self {
            op: OpCode::Heartbeat,
            d: Some(last_sequence.map_or(Value::Null, Value::from)),
            s: None,
            t: None,
        }
    }

    /// Identify (op=2).
    pub fn identify(payload: &IdentifyPayload) -> serde_json::Result<Self> {
        Ok(Self {
            op: OpCode::Identify,
            d: Some(serde_json::to_value(payload)?),
            s: None,
            t: None,
        })
    }
}

/// Hello payload (op=10).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Milliseconds between heartbeats.
    pub heartbeat_interval: u64,
}

/// Gateway intents bitfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intents(pub u64);

impl Intents {
    pub const GUILDS: Self = Self(1 << 0);
    /// Privileged; must be enabled for the application.
    pub const GUILD_MEMBERS: Self = Self(1 << 1);

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionProperties {
    pub os: String,
    pub browser: String,
    pub device: String,
}

impl Default for ConnectionProperties {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: env!("CARGO_PKG_NAME").to_string(),
            device: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

/// Identify payload (op=2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    pub token: String,
    pub intents: Intents,
    pub properties: ConnectionProperties,
}

impl IdentifyPayload {
    /// Identify with the intents the roster export relies on.
    pub fn for_roster_export(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            intents: Intents::GUILDS.union(Intents::GUILD_MEMBERS),
            properties: ConnectionProperties::default(),
        }
    }
}
