use std::collections::BTreeSet;

use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Per-server panel settings. Created on the first `panelogon`/`addadmin`
/// call and mutated in place, never deleted.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub panel_password: Option<String>,
    pub panel_admins: BTreeSet<String>,
}
