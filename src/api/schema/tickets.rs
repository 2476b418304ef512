use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Per-server ticket state. `last_ticket_id` is a monotonic counter; ids are
/// never reused, even after the ticket closes and its entry is removed.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketDirectory {
    pub last_ticket_id: u64,
    pub open_tickets: BTreeMap<u64, OpenTicket>,
}

/// An open ticket. The channel is created by the caller before the record
/// commits, so the stored reference is always a channel that existed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenTicket {
    pub channel_id: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}
