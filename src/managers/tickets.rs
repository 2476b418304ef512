use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::api::schema::moderation::{LogAction, LogEntry};
use crate::api::schema::tickets::OpenTicket;
use crate::error::CoreError;
use crate::managers::store::DocumentStore;

/// Ticket lifecycle: Open → Closed, ids allocated from a monotonic per-server
/// counter and never reused. The Discord channel behind a ticket is managed
/// by the caller: created before `open` commits, deleted before `close`.
pub struct TicketManager {
    store: Arc<DocumentStore>,
}

impl TicketManager {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Records a ticket for an already-created channel and returns its id.
    #[instrument(skip(self))]
    pub async fn open(
        &self,
        server: &str,
        owner: &str,
        channel_id: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, CoreError> {
        self.store
            .update(|doc| {
                let directory = doc.tickets_mut(server);
                directory.last_ticket_id += 1;
                let id = directory.last_ticket_id;
                directory.open_tickets.insert(
                    id,
                    OpenTicket {
                        channel_id: channel_id.to_owned(),
                        owner_id: owner.to_owned(),
                        created_at: now,
                    },
                );
                doc.push_log(LogEntry {
                    server: server.to_owned(),
                    user: owner.to_owned(),
                    action: LogAction::TicketOpen,
                    moderator: owner.to_owned(),
                    detail: format!("ticket #{id}"),
                    time: now,
                });
                Ok(id)
            })
            .await
    }

    /// Read-only probe: which open ticket, if any, lives in this channel?
    /// Used to validate a close request before the channel is deleted.
    pub async fn find(&self, server: &str, channel_id: &str) -> Option<u64> {
        self.store
            .read(|doc| {
                doc.tickets.get(server).and_then(|directory| {
                    directory
                        .open_tickets
                        .iter()
                        .find(|(_, ticket)| ticket.channel_id == channel_id)
                        .map(|(id, _)| *id)
                })
            })
            .await
    }

    /// Removes the open ticket attached to `channel_id`. The id stays burned:
    /// the counter never goes back down.
    #[instrument(skip(self))]
    pub async fn close(
        &self,
        server: &str,
        channel_id: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, CoreError> {
        self.store
            .update(|doc| {
                let directory = doc.tickets_mut(server);
                let Some((id, ticket)) = directory
                    .open_tickets
                    .iter()
                    .find(|(_, ticket)| ticket.channel_id == channel_id)
                    .map(|(id, ticket)| (*id, ticket.clone()))
                else {
                    return Err(CoreError::NotATicketChannel);
                };
                directory.open_tickets.remove(&id);
                doc.push_log(LogEntry {
                    server: server.to_owned(),
                    user: ticket.owner_id,
                    action: LogAction::TicketClose,
                    moderator: actor.to_owned(),
                    detail: format!("ticket #{id}"),
                    time: now,
                });
                Ok(id)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(dir: &tempfile::TempDir) -> TicketManager {
        TicketManager::new(Arc::new(DocumentStore::new(dir.path().join("data.json"))))
    }

    #[tokio::test]
    async fn ids_are_monotonic_and_never_reused() {
        let dir = tempfile::tempdir().unwrap();
        let tickets = manager(&dir);
        let now = Utc::now();

        let a = tickets.open("g1", "u1", "chan-1", now).await.unwrap();
        let b = tickets.open("g1", "u2", "chan-2", now).await.unwrap();
        assert!(b > a);

        tickets.close("g1", "chan-1", "mod", now).await.unwrap();
        let c = tickets.open("g1", "u3", "chan-3", now).await.unwrap();
        assert!(c > b, "closed ids must never be reallocated");
    }

    #[tokio::test]
    async fn close_requires_a_ticket_channel() {
        let dir = tempfile::tempdir().unwrap();
        let tickets = manager(&dir);
        let now = Utc::now();

        let res = tickets.close("g1", "random-chan", "mod", now).await;
        assert!(matches!(res, Err(CoreError::NotATicketChannel)));

        let id = tickets.open("g1", "u1", "chan-1", now).await.unwrap();
        assert_eq!(tickets.find("g1", "chan-1").await, Some(id));

        tickets.close("g1", "chan-1", "mod", now).await.unwrap();
        assert_eq!(tickets.find("g1", "chan-1").await, None);
        let res = tickets.close("g1", "chan-1", "mod", now).await;
        assert!(matches!(res, Err(CoreError::NotATicketChannel)));
    }

    #[tokio::test]
    async fn lifecycle_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let tickets = manager(&dir);
        let now = Utc::now();

        let id = tickets.open("g1", "u1", "chan-1", now).await.unwrap();
        tickets.close("g1", "chan-1", "mod", now).await.unwrap();

        let doc = DocumentStore::new(dir.path().join("data.json")).load().await;
        assert_eq!(doc.logs[0].action, LogAction::TicketClose);
        assert_eq!(doc.logs[0].moderator, "mod");
        assert_eq!(doc.logs[0].user, "u1");
        assert_eq!(doc.logs[1].action, LogAction::TicketOpen);
        assert_eq!(doc.logs[1].detail, format!("ticket #{id}"));
    }
}
