use std::sync::Arc;
use std::time::Duration;

use serenity::http::Http;
use serenity::model::prelude::{ChannelId, MessageId};
use tracing::{info, warn};

use crate::managers::economy::EconomyManager;
use crate::managers::store::DocumentStore;
use crate::managers::widgets::{leaderboard_embed, WidgetManager};

const LEADERBOARD_SIZE: usize = 10;

/// Periodically re-renders every leaderboard widget from a fresh document
/// snapshot. One broken widget never stops the sweep.
pub async fn leaderboard_refresh_task(
    store: Arc<DocumentStore>,
    http: Arc<Http>,
    period: Duration,
) -> ! {
    let widgets = WidgetManager::new(Arc::clone(&store));
    let economy = EconomyManager::new(store);
    let mut interval = tokio::time::interval(period);

    loop {
        interval.tick().await;

        info!("TASK: leaderboard_refresh ({}s interval)", period.as_secs());

        for widget in widgets.all().await {
            let rows = economy
                .top(&widget.server, widget.kind, LEADERBOARD_SIZE)
                .await;
            let embed = leaderboard_embed(widget.kind, &rows);

            let (Ok(channel_id), Ok(message_id)) = (
                widget.channel_id.parse::<u64>(),
                widget.message_id.parse::<u64>(),
            ) else {
                warn!("widget {} has malformed references, skipping", widget.id);
                continue;
            };

            let res = ChannelId(channel_id)
                .edit_message(&http, MessageId(message_id), |m| m.set_embed(embed))
                .await;
            if let Err(err) = res {
                warn!(
                    "could not refresh widget {} in channel {channel_id}: {err}",
                    widget.id
                );
            }
        }
    }
}
