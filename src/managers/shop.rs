use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::api::schema::moderation::{LogAction, LogEntry};
use crate::api::schema::shop::{NewItem, ShopItem};
use crate::error::CoreError;
use crate::managers::store::DocumentStore;

/// Receipt of a committed purchase. `pending_role` is the role the buyer is
/// owed when the item grants one; issuing it is the caller's job and its
/// failure never reopens the transaction.
#[derive(Debug, Clone)]
pub struct Purchase {
    pub item: ShopItem,
    pub pending_role: Option<String>,
}

/// Item CRUD and purchase transactions. Items are addressed by position in
/// the per-server sequence (0-based here, 1-based at the user surfaces).
/// Positions are resolved inside the locked transaction, so they cannot
/// race with concurrent catalog edits.
pub struct ShopManager {
    store: Arc<DocumentStore>,
}

impl ShopManager {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, server: &str) -> Vec<ShopItem> {
        self.store
            .read(|doc| doc.shop.get(server).cloned().unwrap_or_default())
            .await
    }

    #[instrument(skip(self, item), fields(name = %item.name))]
    pub async fn add_item(
        &self,
        server: &str,
        item: NewItem,
        now: DateTime<Utc>,
    ) -> Result<ShopItem, CoreError> {
        self.store
            .update(|doc| {
                let entry = ShopItem {
                    id: now.timestamp_millis(),
                    name: item.name,
                    description: item.description,
                    price: item.price,
                    grants_role: item.grants_role,
                    role_id: item.role_id,
                    required_role_id: item.required_role_id,
                };
                doc.shop_mut(server).push(entry.clone());
                Ok(entry)
            })
            .await
    }

    /// Removes by 0-based index; every later item shifts down one position.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, server: &str, index: usize) -> Result<ShopItem, CoreError> {
        self.store
            .update(|doc| {
                let items = doc.shop_mut(server);
                if index >= items.len() {
                    return Err(CoreError::NotFound("item"));
                }
                Ok(items.remove(index))
            })
            .await
    }

    /// Buys the item at `index`. Checks run in order (existence, required
    /// role, funds) and only then is the debit applied together with the
    /// buyer's stats and the `buy` log line, all in one transaction.
    #[instrument(skip(self, has_role))]
    pub async fn purchase(
        &self,
        server: &str,
        user: &str,
        index: usize,
        has_role: impl FnOnce(&str) -> bool,
        now: DateTime<Utc>,
    ) -> Result<Purchase, CoreError> {
        self.store
            .update(|doc| {
                let items = doc.shop_mut(server);
                let Some(item) = items.get(index).cloned() else {
                    return Err(CoreError::NotFound("item"));
                };

                if !item.required_role_id.is_empty() && !has_role(&item.required_role_id) {
                    return Err(CoreError::MissingRequiredRole);
                }

                let account = doc.account_mut(server, user);
                if account.balance < item.price {
                    return Err(CoreError::InsufficientFunds);
                }
                account.balance -= item.price;
                account.total_spent += item.price;
                account.items_bought += 1;

                doc.push_log(LogEntry {
                    server: server.to_owned(),
                    user: user.to_owned(),
                    action: LogAction::Buy,
                    moderator: user.to_owned(),
                    detail: format!("{} ({} coins)", item.name, item.price),
                    time: now,
                });

                let pending_role = (item.grants_role && !item.role_id.is_empty())
                    .then(|| item.role_id.clone());
                Ok(Purchase { item, pending_role })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::economy::EconomyManager;

    fn managers(dir: &tempfile::TempDir) -> (ShopManager, EconomyManager) {
        let store = Arc::new(DocumentStore::new(dir.path().join("data.json")));
        (
            ShopManager::new(Arc::clone(&store)),
            EconomyManager::new(store),
        )
    }

    fn item(name: &str, price: i64) -> NewItem {
        NewItem {
            name: name.to_owned(),
            price,
            ..NewItem::default()
        }
    }

    #[tokio::test]
    async fn removal_shifts_positions_down() {
        let dir = tempfile::tempdir().unwrap();
        let (shop, eco) = managers(&dir);
        let now = Utc::now();
        shop.add_item("g1", item("X", 10), now).await.unwrap();
        shop.add_item("g1", item("Y", 20), now).await.unwrap();

        let removed = shop.remove_item("g1", 0).await.unwrap();
        assert_eq!(removed.name, "X");

        let listed = shop.list("g1").await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Y");

        // the old position 1 now addresses Y
        eco.credit("g1", "u1", 100).await.unwrap();
        let receipt = shop
            .purchase("g1", "u1", 0, |_| true, now)
            .await
            .unwrap();
        assert_eq!(receipt.item.name, "Y");
    }

    #[tokio::test]
    async fn missing_role_blocks_purchase_without_debit() {
        let dir = tempfile::tempdir().unwrap();
        let (shop, eco) = managers(&dir);
        let now = Utc::now();
        shop.add_item(
            "g1",
            NewItem {
                name: "VIP perk".to_owned(),
                price: 10,
                required_role_id: "role-123".to_owned(),
                ..NewItem::default()
            },
            now,
        )
        .await
        .unwrap();
        eco.credit("g1", "u1", 50).await.unwrap();

        let res = shop.purchase("g1", "u1", 0, |_| false, now).await;
        assert!(matches!(res, Err(CoreError::MissingRequiredRole)));
        assert_eq!(eco.balance("g1", "u1").await, 50);
    }

    #[tokio::test]
    async fn purchase_debits_and_records_stats() {
        let dir = tempfile::tempdir().unwrap();
        let (shop, eco) = managers(&dir);
        let now = Utc::now();
        shop.add_item(
            "g1",
            NewItem {
                name: "Color role".to_owned(),
                price: 60,
                grants_role: true,
                role_id: "role-9".to_owned(),
                ..NewItem::default()
            },
            now,
        )
        .await
        .unwrap();
        eco.credit("g1", "u1", 100).await.unwrap();

        let receipt = shop.purchase("g1", "u1", 0, |_| true, now).await.unwrap();
        assert_eq!(receipt.pending_role.as_deref(), Some("role-9"));
        assert_eq!(eco.balance("g1", "u1").await, 40);

        let doc = DocumentStore::new(dir.path().join("data.json")).load().await;
        let account = &doc.economy["g1"]["u1"];
        assert_eq!(account.total_spent, 60);
        assert_eq!(account.items_bought, 1);
        assert_eq!(doc.logs[0].action, LogAction::Buy);
        assert_eq!(doc.logs[0].user, "u1");
    }

    #[tokio::test]
    async fn out_of_range_positions_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (shop, _eco) = managers(&dir);
        let now = Utc::now();

        let res = shop.remove_item("g1", 0).await;
        assert!(matches!(res, Err(CoreError::NotFound("item"))));
        let res = shop.purchase("g1", "u1", 3, |_| true, now).await;
        assert!(matches!(res, Err(CoreError::NotFound("item"))));
    }

    // credit → blocked work → transfer → purchase too expensive, end to end
    #[tokio::test]
    async fn ledger_and_catalog_compose() {
        let dir = tempfile::tempdir().unwrap();
        let (shop, eco) = managers(&dir);
        let t0 = Utc::now();

        eco.credit("g1", "u", 100).await.unwrap();
        eco.claim_work("g1", "u", t0).await.unwrap();
        let res = eco
            .claim_work("g1", "u", t0 + chrono::Duration::minutes(5))
            .await;
        assert!(matches!(res, Err(CoreError::CooldownActive(_))));

        // drop the wage again so the arithmetic below stays exact
        let earned = eco.balance("g1", "u").await - 100;
        eco.credit("g1", "u", -earned).await.unwrap();

        eco.transfer("g1", "u", "v", 50, t0).await.unwrap();
        assert_eq!(eco.balance("g1", "u").await, 50);
        assert_eq!(eco.balance("g1", "v").await, 50);

        shop.add_item("g1", item("Trophy", 60), t0).await.unwrap();
        let res = shop.purchase("g1", "v", 0, |_| true, t0).await;
        assert!(matches!(res, Err(CoreError::InsufficientFunds)));
        assert_eq!(eco.balance("g1", "v").await, 50);
    }
}
