use chrono::{DateTime, Utc};
use serde_derive::Deserialize;
use serde_derive::Serialize;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum LogAction {
    Warn,
    Kick,
    Ban,
    Mute,
    Unmute,
    Buy,
    Pay,
    TicketOpen,
    TicketClose,
}

/// Append-only history line, newest first. Readers only ever take a capped
/// prefix, the sequence itself is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub server: String,
    pub user: String,
    pub action: LogAction,
    pub moderator: String,
    pub detail: String,
    pub time: DateTime<Utc>,
}

/// Keyed by user id, last write wins. Expiry is manual: `unmute` deletes the
/// record, nothing else does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuteRecord {
    pub server: String,
    pub moderator: String,
    pub reason: String,
    #[serde(default)]
    pub duration: Option<String>,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanRecord {
    pub server: String,
    pub moderator: String,
    pub reason: String,
    pub time: DateTime<Utc>,
}
