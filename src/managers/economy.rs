use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::instrument;

use crate::api::schema::moderation::{LogAction, LogEntry};
use crate::api::schema::widget::LeaderboardKind;
use crate::error::CoreError;
use crate::managers::store::DocumentStore;

const WORK_COOLDOWN_MS: i64 = 10 * 60 * 1000;
const DAILY_COOLDOWN_MS: i64 = 24 * 60 * 60 * 1000;
const WEEKLY_COOLDOWN_MS: i64 = 7 * 24 * 60 * 60 * 1000;

const WORK_EARN_MIN: i64 = 20;
const WORK_EARN_MAX: i64 = 100;
const DAILY_REWARD: i64 = 250;
const WEEKLY_REWARD: i64 = 2000;

/// Balance mutations, cooldown-gated rewards and peer transfers. Every write
/// is one store transaction; the cooldown check always compares the stored
/// timestamp against the caller-supplied clock.
pub struct EconomyManager {
    store: Arc<DocumentStore>,
}

impl EconomyManager {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn balance(&self, server: &str, user: &str) -> i64 {
        self.store
            .read(|doc| {
                doc.economy
                    .get(server)
                    .and_then(|accounts| accounts.get(user))
                    .map(|account| account.balance)
                    .unwrap_or(0)
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn credit(&self, server: &str, user: &str, amount: i64) -> Result<i64, CoreError> {
        self.store
            .update(|doc| {
                let account = doc.account_mut(server, user);
                account.balance += amount;
                Ok(account.balance)
            })
            .await
    }

    /// Rolls a random wage in `[20, 100)` once the 10-minute cooldown is up.
    #[instrument(skip(self))]
    pub async fn claim_work(
        &self,
        server: &str,
        user: &str,
        now: DateTime<Utc>,
    ) -> Result<i64, CoreError> {
        let earn = rand::thread_rng().gen_range(WORK_EARN_MIN..WORK_EARN_MAX);
        self.store
            .update(|doc| {
                let account = doc.account_mut(server, user);
                check_cooldown(account.last_work, WORK_COOLDOWN_MS, now)?;
                account.last_work = now.timestamp_millis();
                account.balance += earn;
                Ok(earn)
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn claim_daily(
        &self,
        server: &str,
        user: &str,
        now: DateTime<Utc>,
    ) -> Result<i64, CoreError> {
        self.store
            .update(|doc| {
                let account = doc.account_mut(server, user);
                check_cooldown(account.last_daily, DAILY_COOLDOWN_MS, now)?;
                account.last_daily = now.timestamp_millis();
                account.balance += DAILY_REWARD;
                Ok(DAILY_REWARD)
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn claim_weekly(
        &self,
        server: &str,
        user: &str,
        now: DateTime<Utc>,
    ) -> Result<i64, CoreError> {
        self.store
            .update(|doc| {
                let account = doc.account_mut(server, user);
                check_cooldown(account.last_weekly, WEEKLY_COOLDOWN_MS, now)?;
                account.last_weekly = now.timestamp_millis();
                account.balance += WEEKLY_REWARD;
                Ok(WEEKLY_REWARD)
            })
            .await
    }

    /// Moves `amount` between two accounts of the same server. Both sides are
    /// read and written inside one snapshot, so the two-account sum is
    /// conserved and a half-applied transfer cannot be persisted.
    #[instrument(skip(self))]
    pub async fn transfer(
        &self,
        server: &str,
        from: &str,
        to: &str,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if from == to {
            return Err(CoreError::SelfTransfer);
        }
        self.store
            .update(|doc| {
                if doc.account_mut(server, from).balance < amount {
                    return Err(CoreError::InsufficientFunds);
                }
                doc.account_mut(server, from).balance -= amount;
                doc.account_mut(server, to).balance += amount;
                doc.push_log(LogEntry {
                    server: server.to_owned(),
                    user: to.to_owned(),
                    action: LogAction::Pay,
                    moderator: from.to_owned(),
                    detail: format!("{amount} coins"),
                    time: now,
                });
                Ok(())
            })
            .await
    }

    /// Sorted snapshot for leaderboard rendering.
    pub async fn top(&self, server: &str, kind: LeaderboardKind, limit: usize) -> Vec<(String, i64)> {
        self.store
            .read(|doc| {
                let Some(accounts) = doc.economy.get(server) else {
                    return Vec::new();
                };
                let mut rows: Vec<(String, i64)> = accounts
                    .iter()
                    .map(|(id, account)| {
                        let value = match kind {
                            LeaderboardKind::Coins => account.balance,
                            LeaderboardKind::Spent => account.total_spent,
                            LeaderboardKind::Items => account.items_bought,
                        };
                        (id.clone(), value)
                    })
                    .collect();
                rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                rows.truncate(limit);
                rows
            })
            .await
    }
}

fn check_cooldown(last_ms: i64, period_ms: i64, now: DateTime<Utc>) -> Result<(), CoreError> {
    let elapsed = now.timestamp_millis() - last_ms;
    if elapsed < period_ms {
        return Err(CoreError::CooldownActive(Duration::milliseconds(
            period_ms - elapsed,
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(dir: &tempfile::TempDir) -> EconomyManager {
        EconomyManager::new(Arc::new(DocumentStore::new(dir.path().join("data.json"))))
    }

    #[tokio::test]
    async fn transfer_conserves_the_two_account_sum() {
        let dir = tempfile::tempdir().unwrap();
        let eco = manager(&dir);
        eco.credit("g1", "alice", 100).await.unwrap();
        eco.credit("g1", "bob", 40).await.unwrap();

        eco.transfer("g1", "alice", "bob", 60, Utc::now()).await.unwrap();

        assert_eq!(eco.balance("g1", "alice").await, 40);
        assert_eq!(eco.balance("g1", "bob").await, 100);
    }

    #[tokio::test]
    async fn transfer_rejects_self_and_overdraft() {
        let dir = tempfile::tempdir().unwrap();
        let eco = manager(&dir);
        eco.credit("g1", "alice", 30).await.unwrap();

        let res = eco.transfer("g1", "alice", "alice", 10, Utc::now()).await;
        assert!(matches!(res, Err(CoreError::SelfTransfer)));

        let res = eco.transfer("g1", "alice", "bob", 31, Utc::now()).await;
        assert!(matches!(res, Err(CoreError::InsufficientFunds)));
        assert_eq!(eco.balance("g1", "alice").await, 30);
        assert_eq!(eco.balance("g1", "bob").await, 0);
    }

    #[tokio::test]
    async fn daily_cooldown_is_monotonic() {
        let dir = tempfile::tempdir().unwrap();
        let eco = manager(&dir);
        let t0 = Utc::now();

        assert_eq!(eco.claim_daily("g1", "u1", t0).await.unwrap(), 250);
        assert_eq!(eco.balance("g1", "u1").await, 250);

        let early = t0 + Duration::hours(23);
        match eco.claim_daily("g1", "u1", early).await {
            Err(CoreError::CooldownActive(remaining)) => {
                assert!(remaining <= Duration::hours(1));
                assert!(remaining > Duration::zero());
            }
            other => panic!("expected cooldown, got {other:?}"),
        }

        let due = t0 + Duration::hours(24);
        assert_eq!(eco.claim_daily("g1", "u1", due).await.unwrap(), 250);
        assert_eq!(eco.balance("g1", "u1").await, 500);
    }

    #[tokio::test]
    async fn work_pays_within_range_and_respects_cooldown() {
        let dir = tempfile::tempdir().unwrap();
        let eco = manager(&dir);
        let t0 = Utc::now();

        let earn = eco.claim_work("g1", "u1", t0).await.unwrap();
        assert!((20..100).contains(&earn));
        assert_eq!(eco.balance("g1", "u1").await, earn);

        let res = eco.claim_work("g1", "u1", t0 + Duration::minutes(9)).await;
        assert!(matches!(res, Err(CoreError::CooldownActive(_))));

        let again = eco
            .claim_work("g1", "u1", t0 + Duration::minutes(10))
            .await
            .unwrap();
        assert!((20..100).contains(&again));
    }

    #[tokio::test]
    async fn weekly_pays_2000_once_per_week() {
        let dir = tempfile::tempdir().unwrap();
        let eco = manager(&dir);
        let t0 = Utc::now();

        assert_eq!(eco.claim_weekly("g1", "u1", t0).await.unwrap(), 2000);
        let res = eco.claim_weekly("g1", "u1", t0 + Duration::days(6)).await;
        assert!(matches!(res, Err(CoreError::CooldownActive(_))));
        assert_eq!(
            eco.claim_weekly("g1", "u1", t0 + Duration::days(7)).await.unwrap(),
            2000
        );
    }

    #[tokio::test]
    async fn transfer_is_logged_as_pay() {
        let dir = tempfile::tempdir().unwrap();
        let eco = manager(&dir);
        eco.credit("g1", "alice", 50).await.unwrap();
        eco.transfer("g1", "alice", "bob", 20, Utc::now()).await.unwrap();

        let store = DocumentStore::new(dir.path().join("data.json"));
        let doc = store.load().await;
        assert_eq!(doc.logs.len(), 1);
        assert_eq!(doc.logs[0].action, LogAction::Pay);
        assert_eq!(doc.logs[0].moderator, "alice");
        assert_eq!(doc.logs[0].user, "bob");
    }

    #[tokio::test]
    async fn top_sorts_by_requested_stat() {
        let dir = tempfile::tempdir().unwrap();
        let eco = manager(&dir);
        eco.credit("g1", "a", 10).await.unwrap();
        eco.credit("g1", "b", 30).await.unwrap();
        eco.credit("g1", "c", 20).await.unwrap();

        let rows = eco.top("g1", LeaderboardKind::Coins, 2).await;
        assert_eq!(rows, vec![("b".to_owned(), 30), ("c".to_owned(), 20)]);
        assert!(eco.top("g2", LeaderboardKind::Coins, 5).await.is_empty());
    }
}
