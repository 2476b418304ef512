use std::fs::File;

use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub token: String,
    pub activity: Activity,
    pub data_file: String,
    pub panel: Panel,
    #[serde(default = "default_refresh_secs")]
    pub leaderboard_refresh_secs: u64,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub type_field: String,
    pub description: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub port: u16,
}

fn default_refresh_secs() -> u64 {
    300
}

impl Settings {
    pub fn new() -> Self {
        let json_file = File::open("bot_config.json").expect("Failed to open bot_config.json");

        serde_json::from_reader(json_file).expect("Failed to parse bot_config.json")
    }
}
