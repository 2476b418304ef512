use std::sync::Arc;

use serenity::builder::CreateEmbed;
use tracing::instrument;
use uuid::Uuid;

use crate::api::schema::widget::{LeaderboardKind, Widget};
use crate::error::CoreError;
use crate::managers::store::DocumentStore;

/// How a `delwidget` call names its target.
#[derive(Debug, Clone)]
pub enum WidgetSelector {
    Id(Uuid),
    Channel(String),
}

/// Registry of pinned leaderboard messages. The refresher task owns the other
/// half of the contract: it reads `all()` and re-renders each message.
pub struct WidgetManager {
    store: Arc<DocumentStore>,
}

impl WidgetManager {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn add(
        &self,
        server: &str,
        channel_id: &str,
        message_id: &str,
        kind: LeaderboardKind,
    ) -> Result<Widget, CoreError> {
        let widget = Widget {
            id: Uuid::new_v4(),
            server: server.to_owned(),
            channel_id: channel_id.to_owned(),
            message_id: message_id.to_owned(),
            kind,
        };
        let stored = widget.clone();
        self.store
            .update(move |doc| {
                doc.widgets.push(stored);
                Ok(())
            })
            .await?;
        Ok(widget)
    }

    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        server: &str,
        selector: WidgetSelector,
    ) -> Result<Widget, CoreError> {
        self.store
            .update(|doc| {
                let pos = doc.widgets.iter().position(|w| {
                    w.server == server
                        && match &selector {
                            WidgetSelector::Id(id) => w.id == *id,
                            WidgetSelector::Channel(channel) => w.channel_id == *channel,
                        }
                });
                match pos {
                    Some(pos) => Ok(doc.widgets.remove(pos)),
                    None => Err(CoreError::NotFound("widget")),
                }
            })
            .await
    }

    pub async fn list(&self, server: &str) -> Vec<Widget> {
        self.store
            .read(|doc| {
                doc.widgets
                    .iter()
                    .filter(|w| w.server == server)
                    .cloned()
                    .collect()
            })
            .await
    }

    /// Every widget across every server, for the refresher sweep.
    pub async fn all(&self) -> Vec<Widget> {
        self.store.read(|doc| doc.widgets.clone()).await
    }
}

/// Renders one leaderboard embed from a sorted stat snapshot.
pub fn leaderboard_embed(kind: LeaderboardKind, rows: &[(String, i64)]) -> CreateEmbed {
    let mut desc = String::new();
    for (index, (user, value)) in rows.iter().enumerate() {
        let medal = match index {
            0 => "🥇",
            1 => "🥈",
            2 => "🥉",
            _ => "▫️",
        };
        desc.push_str(&format!("{} <@{}> — **{}**\n", medal, user, value));
    }
    if desc.is_empty() {
        desc.push_str("Nothing here yet.");
    }

    CreateEmbed::default()
        .title(kind.title())
        .description(desc)
        .clone()
}
