use std::{collections::HashSet, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Discord snowflake id (user, role, guild, application, interaction).
///
/// The wire form is a decimal string; integers are accepted too.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Snowflake(pub u64);

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Snowflake {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Snowflake)
    }
}

impl Serialize for Snowflake {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Int(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Str(s) => s
                .parse()
                .map_err(|e| de::Error::custom(format!("invalid snowflake {s:?}: {e}"))),
            Raw::Int(n) => Ok(Snowflake(n)),
        }
    }
}

/// A guild member as seen at snapshot time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: Snowflake,
    /// Account handle.
    pub username: String,
    /// Effective shown name (may equal `username`).
    pub display_name: String,
    /// Guild-specific override.
    pub nickname: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
    pub role_ids: HashSet<Snowflake>,
}

/// A guild role definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Role {
    pub id: Snowflake,
    pub name: String,
    /// Relative display order; not necessarily contiguous, ties possible.
    pub position: i64,
    /// Implicit base role every member holds (`@everyone`).
    pub is_everyone: bool,
}

/// Point-in-time copy of a guild's members and roles, fetched for one export.
#[derive(Clone, Debug, Default)]
pub struct RosterSnapshot {
    pub members: Vec<Member>,
    pub roles: Vec<Role>,
}
