use std::fmt::Display;

use serde_derive::Deserialize;
use serde_derive::Serialize;
use strum_macros::EnumIter;
use uuid::Uuid;

/// A pinned leaderboard message kept fresh by the refresher task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: Uuid,
    pub server: String,
    pub channel_id: String,
    pub message_id: String,
    pub kind: LeaderboardKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "camelCase")]
pub enum LeaderboardKind {
    Coins,
    Spent,
    Items,
}

impl Display for LeaderboardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coins => write!(f, "coins"),
            Self::Spent => write!(f, "spent"),
            Self::Items => write!(f, "items"),
        }
    }
}

impl LeaderboardKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "coins" => Some(Self::Coins),
            "spent" => Some(Self::Spent),
            "items" => Some(Self::Items),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Coins => "Richest members",
            Self::Spent => "Biggest spenders",
            Self::Items => "Most items bought",
        }
    }
}
