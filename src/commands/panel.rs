use serenity::builder::CreateApplicationCommand;
use serenity::model::prelude::command::CommandOptionType;
use serenity::model::prelude::interaction::application_command::CommandDataOption;

use crate::api::bot::{Bot, Invoker};
use crate::error::CoreError;
use crate::util::{req_string, req_user};

pub fn register_panelogon(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("panelogon")
        .description("Set this server's web panel password")
        .create_option(|option| {
            option
                .name("password")
                .description("The panel password")
                .kind(CommandOptionType::String)
                .required(true)
        })
}

pub fn register_addadmin(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("addadmin")
        .description("Add a panel admin (admin)")
        .create_option(|option| {
            option
                .name("user")
                .description("The member")
                .kind(CommandOptionType::User)
                .required(true)
        })
}

pub fn register_removeadmin(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("removeadmin")
        .description("Remove a panel admin (admin)")
        .create_option(|option| {
            option
                .name("user")
                .description("The member")
                .kind(CommandOptionType::User)
                .required(true)
        })
}

pub async fn run_panelogon(
    options: &[CommandDataOption],
    bot: &Bot,
    who: &Invoker,
) -> Result<String, CoreError> {
    let password = req_string(options, "password")?;
    if password.trim().is_empty() {
        return Err(CoreError::Validation("password cannot be empty".to_owned()));
    }

    bot.panel.set_password(&who.server(), password).await?;
    Ok(format!(
        "✅ Panel password set!\nServer ID: {}",
        who.server()
    ))
}

pub async fn run_addadmin(
    options: &[CommandDataOption],
    bot: &Bot,
    who: &Invoker,
) -> Result<String, CoreError> {
    let target = req_user(options, "user")?;
    let inserted = bot
        .panel
        .add_admin(&who.server(), &target.id.to_string())
        .await?;
    if inserted {
        Ok(format!("✅ {} is now a panel admin", target.tag()))
    } else {
        Ok(format!("{} already is a panel admin", target.tag()))
    }
}

pub async fn run_removeadmin(
    options: &[CommandDataOption],
    bot: &Bot,
    who: &Invoker,
) -> Result<String, CoreError> {
    let target = req_user(options, "user")?;
    let removed = bot
        .panel
        .remove_admin(&who.server(), &target.id.to_string())
        .await?;
    if removed {
        Ok(format!("✅ {} is no longer a panel admin", target.tag()))
    } else {
        Ok(format!("{} was not a panel admin", target.tag()))
    }
}
