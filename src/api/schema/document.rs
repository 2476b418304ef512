use std::collections::HashMap;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::economy::EconomyAccount;
use super::moderation::{BanRecord, LogEntry, MuteRecord};
use super::server::ServerConfig;
use super::shop::ShopItem;
use super::tickets::TicketDirectory;
use super::widget::Widget;

/// The whole persisted world: every server's state inside one versionless
/// structure. All entities are owned here; nothing escapes a single
/// load→mutate→save cycle by reference.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub servers: HashMap<String, ServerConfig>,
    pub logs: Vec<LogEntry>,
    pub mutes: HashMap<String, MuteRecord>,
    pub bans: HashMap<String, BanRecord>,
    pub economy: HashMap<String, HashMap<String, EconomyAccount>>,
    pub shop: HashMap<String, Vec<ShopItem>>,
    pub widgets: Vec<Widget>,
    pub tickets: HashMap<String, TicketDirectory>,
}

/// Lazy registry: every accessor installs an empty default in place on first
/// use and never overwrites an existing sub-record.
impl Document {
    pub fn server_config_mut(&mut self, server: &str) -> &mut ServerConfig {
        self.servers.entry(server.to_owned()).or_default()
    }

    pub fn economy_mut(&mut self, server: &str) -> &mut HashMap<String, EconomyAccount> {
        self.economy.entry(server.to_owned()).or_default()
    }

    pub fn account_mut(&mut self, server: &str, user: &str) -> &mut EconomyAccount {
        self.economy_mut(server).entry(user.to_owned()).or_default()
    }

    pub fn shop_mut(&mut self, server: &str) -> &mut Vec<ShopItem> {
        self.shop.entry(server.to_owned()).or_default()
    }

    pub fn tickets_mut(&mut self, server: &str) -> &mut TicketDirectory {
        self.tickets.entry(server.to_owned()).or_default()
    }

    /// Prepend: the history reads newest first.
    pub fn push_log(&mut self, entry: LogEntry) {
        self.logs.insert(0, entry);
    }
}
