use serenity::builder::CreateApplicationCommand;
use serenity::model::prelude::command::CommandOptionType;
use serenity::model::prelude::interaction::application_command::CommandDataOption;
use serenity::model::prelude::ChannelId;
use serenity::prelude::Context;
use strum::IntoEnumIterator;
use tracing::warn;
use uuid::Uuid;

use crate::api::bot::{Bot, Invoker};
use crate::api::schema::widget::LeaderboardKind;
use crate::error::CoreError;
use crate::managers::widgets::{leaderboard_embed, WidgetSelector};
use crate::util::{opt_channel, opt_string, req_string};

const LEADERBOARD_SIZE: usize = 10;

pub fn register_addwidget(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("addwidget")
        .description("Pin a live leaderboard in this channel (admin)")
        .create_option(|option| {
            option
                .name("kind")
                .description("Which leaderboard")
                .kind(CommandOptionType::String)
                .required(true);
            for kind in LeaderboardKind::iter() {
                option.add_string_choice(kind, kind);
            }
            option
        })
}

pub fn register_delwidget(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("delwidget")
        .description("Remove a leaderboard widget (admin)")
        .create_option(|option| {
            option
                .name("id")
                .description("Widget id shown when it was created")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .create_option(|option| {
            option
                .name("channel")
                .description("Channel holding the widget")
                .kind(CommandOptionType::Channel)
                .required(false)
        })
}

pub async fn run_addwidget(
    options: &[CommandDataOption],
    ctx: &Context,
    bot: &Bot,
    who: &Invoker,
    channel_id: ChannelId,
) -> Result<String, CoreError> {
    let kind = req_string(options, "kind")?;
    let Some(kind) = LeaderboardKind::parse(kind) else {
        return Err(CoreError::Validation(format!("unknown leaderboard `{kind}`")));
    };

    // post the initial rendering first, the widget records its message id
    let rows = bot.economy.top(&who.server(), kind, LEADERBOARD_SIZE).await;
    let embed = leaderboard_embed(kind, &rows);
    let message = channel_id
        .send_message(&ctx.http, |m| m.set_embed(embed))
        .await
        .map_err(|err| CoreError::Actuator(err.to_string()))?;

    let widget = match bot
        .widgets
        .add(
            &who.server(),
            &channel_id.to_string(),
            &message.id.to_string(),
            kind,
        )
        .await
    {
        Ok(widget) => widget,
        Err(err) => {
            if let Err(del_err) = message.delete(&ctx.http).await {
                warn!("could not clean up widget message: {del_err}");
            }
            return Err(err);
        }
    };

    Ok(format!("📊 Leaderboard widget added (id `{}`)", widget.id))
}

pub async fn run_delwidget(
    options: &[CommandDataOption],
    bot: &Bot,
    who: &Invoker,
) -> Result<String, CoreError> {
    let selector = if let Some(raw) = opt_string(options, "id") {
        let id = Uuid::parse_str(raw)
            .map_err(|_| CoreError::Validation(format!("`{raw}` is not a widget id")))?;
        WidgetSelector::Id(id)
    } else if let Some(channel) = opt_channel(options, "channel") {
        WidgetSelector::Channel(channel.id.to_string())
    } else {
        return Err(CoreError::Validation(
            "provide a widget id or a channel".to_owned(),
        ));
    };

    let removed = bot.widgets.remove(&who.server(), selector).await?;
    Ok(format!("🗑️ Removed the {} widget", removed.kind))
}
