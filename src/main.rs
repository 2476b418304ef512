mod api;
mod commands;
mod error;
pub mod managers;
mod panel;
mod settings;
mod tasks;
mod util;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use api::bot::Bot;
use serenity::prelude::*;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let file_appender = tracing_appender::rolling::daily("logs", "steward.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    let settings = settings::Settings::new();
    let bot = Bot::new(settings.clone());
    let store = Arc::clone(&bot.store);

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES;

    let mut client = Client::builder(settings.token.clone(), intents)
        .event_handler(bot)
        .await?;

    let panel_addr = SocketAddr::from(([0, 0, 0, 0], settings.panel.port));
    tokio::spawn(panel::server::panel_init(Arc::clone(&store), panel_addr));

    let http = Arc::clone(&client.cache_and_http.http);
    tokio::spawn(tasks::leaderboards::leaderboard_refresh_task(
        store,
        http,
        Duration::from_secs(settings.leaderboard_refresh_secs),
    ));

    if let Err(why) = client.start().await {
        println!("Client error: {why:#?}");
    }
    Ok(())
}
