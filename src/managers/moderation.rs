use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::api::schema::moderation::{BanRecord, LogAction, LogEntry, MuteRecord};
use crate::error::CoreError;
use crate::managers::store::DocumentStore;

/// Append-only action history plus the keyed mute/ban records. Records are
/// last-write-wins and only disappear through an explicit unmute/unban.
pub struct ModerationManager {
    store: Arc<DocumentStore>,
}

impl ModerationManager {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Appends one history line. Used for warn/kick and by the other
    /// managers' composite operations.
    #[instrument(skip(self))]
    pub async fn log(
        &self,
        server: &str,
        user: &str,
        action: LogAction,
        moderator: &str,
        detail: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        self.store
            .update(|doc| {
                doc.push_log(LogEntry {
                    server: server.to_owned(),
                    user: user.to_owned(),
                    action,
                    moderator: moderator.to_owned(),
                    detail: detail.to_owned(),
                    time: now,
                });
                Ok(())
            })
            .await
    }

    /// Newest-first prefix of the history, filtered by server.
    pub async fn recent(&self, server: &str, limit: usize) -> Vec<LogEntry> {
        self.store
            .read(|doc| {
                doc.logs
                    .iter()
                    .filter(|entry| entry.server == server)
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn record_mute(
        &self,
        server: &str,
        user: &str,
        moderator: &str,
        duration: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        self.store
            .update(|doc| {
                let detail = duration.clone().unwrap_or_else(|| "manual".to_owned());
                doc.mutes.insert(
                    user.to_owned(),
                    MuteRecord {
                        server: server.to_owned(),
                        moderator: moderator.to_owned(),
                        reason: detail.clone(),
                        duration,
                        time: now,
                    },
                );
                doc.push_log(LogEntry {
                    server: server.to_owned(),
                    user: user.to_owned(),
                    action: LogAction::Mute,
                    moderator: moderator.to_owned(),
                    detail,
                    time: now,
                });
                Ok(())
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn remove_mute(
        &self,
        server: &str,
        user: &str,
        moderator: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        self.store
            .update(|doc| {
                doc.mutes.remove(user);
                doc.push_log(LogEntry {
                    server: server.to_owned(),
                    user: user.to_owned(),
                    action: LogAction::Unmute,
                    moderator: moderator.to_owned(),
                    detail: "manual".to_owned(),
                    time: now,
                });
                Ok(())
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn record_ban(
        &self,
        server: &str,
        user: &str,
        moderator: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        self.store
            .update(|doc| {
                doc.bans.insert(
                    user.to_owned(),
                    BanRecord {
                        server: server.to_owned(),
                        moderator: moderator.to_owned(),
                        reason: reason.to_owned(),
                        time: now,
                    },
                );
                doc.push_log(LogEntry {
                    server: server.to_owned(),
                    user: user.to_owned(),
                    action: LogAction::Ban,
                    moderator: moderator.to_owned(),
                    detail: reason.to_owned(),
                    time: now,
                });
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(dir: &tempfile::TempDir) -> ModerationManager {
        ModerationManager::new(Arc::new(DocumentStore::new(dir.path().join("data.json"))))
    }

    #[tokio::test]
    async fn history_reads_newest_first_per_server() {
        let dir = tempfile::tempdir().unwrap();
        let log = manager(&dir);
        let now = Utc::now();

        log.log("g1", "u1", LogAction::Warn, "mod", "spam", now).await.unwrap();
        log.log("g2", "u2", LogAction::Warn, "mod", "other server", now).await.unwrap();
        log.log("g1", "u3", LogAction::Kick, "mod", "rude", now).await.unwrap();

        let entries = log.recent("g1", 200).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, LogAction::Kick);
        assert_eq!(entries[1].action, LogAction::Warn);

        let capped = log.recent("g1", 1).await;
        assert_eq!(capped.len(), 1);
    }

    #[tokio::test]
    async fn mute_records_are_last_write_wins_until_unmute() {
        let dir = tempfile::tempdir().unwrap();
        let log = manager(&dir);
        let now = Utc::now();

        log.record_mute("g1", "u1", "modA", Some("10m".to_owned()), now)
            .await
            .unwrap();
        log.record_mute("g1", "u1", "modB", None, now).await.unwrap();

        let store = DocumentStore::new(dir.path().join("data.json"));
        let doc = store.load().await;
        assert_eq!(doc.mutes["u1"].moderator, "modB");

        log.remove_mute("g1", "u1", "modA", now).await.unwrap();
        let doc = store.load().await;
        assert!(doc.mutes.is_empty());
        assert_eq!(doc.logs[0].action, LogAction::Unmute);
    }

    #[tokio::test]
    async fn bans_keep_the_record_and_the_history_line() {
        let dir = tempfile::tempdir().unwrap();
        let log = manager(&dir);
        let now = Utc::now();

        log.record_ban("g1", "u1", "mod", "raiding", now).await.unwrap();

        let doc = DocumentStore::new(dir.path().join("data.json")).load().await;
        assert_eq!(doc.bans["u1"].reason, "raiding");
        assert_eq!(doc.logs[0].action, LogAction::Ban);
    }
}
