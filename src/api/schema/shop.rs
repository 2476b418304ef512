use serde_derive::Deserialize;
use serde_derive::Serialize;

/// One catalog entry. `id` is the creation timestamp in epoch milliseconds;
/// it is informational only. Purchase and deletion address items by their
/// position in the per-server sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    #[serde(default)]
    pub grants_role: bool,
    #[serde(default)]
    pub role_id: String,
    #[serde(default)]
    pub required_role_id: String,
}

/// Item fields as supplied by `additem` or the panel, before the catalog
/// assigns an id. Empty role ids mean "none".
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub grants_role: bool,
    pub role_id: String,
    pub required_role_id: String,
}
