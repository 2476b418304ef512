use chrono::Utc;
use serenity::builder::CreateApplicationCommand;
use serenity::model::prelude::command::CommandOptionType;
use serenity::model::prelude::interaction::application_command::CommandDataOption;
use serenity::prelude::Context;

use crate::api::bot::{Bot, Invoker};
use crate::api::schema::moderation::LogAction;
use crate::error::CoreError;
use crate::util::{opt_string, req_user, validate_duration};

const NO_REASON: &str = "No reason given";

fn user_and_reason(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.create_option(|option| {
        option
            .name("user")
            .description("The member")
            .kind(CommandOptionType::User)
            .required(true)
    })
    .create_option(|option| {
        option
            .name("reason")
            .description("Why")
            .kind(CommandOptionType::String)
            .required(false)
    })
}

pub fn register_warn(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    user_and_reason(cmd.name("warn").description("Warn a member (admin)"))
}

pub fn register_kick(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    user_and_reason(cmd.name("kick").description("Kick a member (admin)"))
}

pub fn register_ban(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    user_and_reason(cmd.name("ban").description("Ban a member (admin)"))
}

pub fn register_mute(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("mute")
        .description("Mute a member (admin)")
        .create_option(|option| {
            option
                .name("user")
                .description("The member")
                .kind(CommandOptionType::User)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("duration")
                .description("Duration such as 10m or 2h")
                .kind(CommandOptionType::String)
                .required(false)
        })
}

pub fn register_unmute(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("unmute")
        .description("Unmute a member (admin)")
        .create_option(|option| {
            option
                .name("user")
                .description("The member")
                .kind(CommandOptionType::User)
                .required(true)
        })
}

pub async fn run_warn(
    options: &[CommandDataOption],
    bot: &Bot,
    who: &Invoker,
) -> Result<String, CoreError> {
    let target = req_user(options, "user")?;
    let reason = opt_string(options, "reason").unwrap_or(NO_REASON);

    bot.moderation
        .log(
            &who.server(),
            &target.id.to_string(),
            LogAction::Warn,
            &who.tag(),
            reason,
            Utc::now(),
        )
        .await?;
    Ok(format!("⚠️ Warned {}", target.tag()))
}

/// The kick itself gates the log line: a member the platform refuses to kick
/// is never recorded as kicked.
pub async fn run_kick(
    options: &[CommandDataOption],
    ctx: &Context,
    bot: &Bot,
    who: &Invoker,
) -> Result<String, CoreError> {
    let target = req_user(options, "user")?;
    let reason = opt_string(options, "reason").unwrap_or(NO_REASON);

    who.guild_id
        .kick_with_reason(&ctx.http, target.id, reason)
        .await
        .map_err(|err| CoreError::Actuator(err.to_string()))?;

    bot.moderation
        .log(
            &who.server(),
            &target.id.to_string(),
            LogAction::Kick,
            &who.tag(),
            reason,
            Utc::now(),
        )
        .await?;
    Ok(format!("🔨 Kicked {}", target.tag()))
}

pub async fn run_ban(
    options: &[CommandDataOption],
    ctx: &Context,
    bot: &Bot,
    who: &Invoker,
) -> Result<String, CoreError> {
    let target = req_user(options, "user")?;
    let reason = opt_string(options, "reason").unwrap_or(NO_REASON);

    who.guild_id
        .ban_with_reason(&ctx.http, target.id, 0, reason)
        .await
        .map_err(|err| CoreError::Actuator(err.to_string()))?;

    bot.moderation
        .record_ban(&who.server(), &target.id.to_string(), &who.tag(), reason, Utc::now())
        .await?;
    Ok(format!("🚫 Banned {}", target.tag()))
}

pub async fn run_mute(
    options: &[CommandDataOption],
    bot: &Bot,
    who: &Invoker,
) -> Result<String, CoreError> {
    let target = req_user(options, "user")?;
    let duration = opt_string(options, "duration");
    if let Some(duration) = duration {
        validate_duration(duration)?;
    }

    bot.moderation
        .record_mute(
            &who.server(),
            &target.id.to_string(),
            &who.tag(),
            duration.map(str::to_owned),
            Utc::now(),
        )
        .await?;
    Ok(format!("🔇 Muted {}", target.tag()))
}

pub async fn run_unmute(
    options: &[CommandDataOption],
    bot: &Bot,
    who: &Invoker,
) -> Result<String, CoreError> {
    let target = req_user(options, "user")?;

    bot.moderation
        .remove_mute(&who.server(), &target.id.to_string(), &who.tag(), Utc::now())
        .await?;
    Ok(format!("🔊 Unmuted {}", target.tag()))
}
