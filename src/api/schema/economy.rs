use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Per-(server, user) ledger record. Created lazily with all-zero defaults on
/// first access and never deleted. Cooldown fields hold epoch milliseconds so
/// a fresh account is immediately eligible for every reward.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EconomyAccount {
    pub balance: i64,
    pub last_work: i64,
    pub last_daily: i64,
    pub last_weekly: i64,
    pub total_spent: i64,
    pub items_bought: i64,
}
