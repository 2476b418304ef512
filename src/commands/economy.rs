use chrono::Utc;
use serenity::builder::CreateApplicationCommand;
use serenity::model::prelude::command::CommandOptionType;
use serenity::model::prelude::interaction::application_command::CommandDataOption;

use crate::api::bot::{Bot, Invoker};
use crate::error::CoreError;
use crate::util::{positive_amount, req_integer, req_user};

pub fn register_balance(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("balance").description("Check your coin balance")
}

pub fn register_work(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("work").description("Work to earn some coins")
}

pub fn register_daily(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("daily").description("Claim your daily reward")
}

pub fn register_weekly(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("weekly").description("Claim your weekly reward")
}

pub fn register_pay(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("pay")
        .description("Send coins to another member")
        .create_option(|option| {
            option
                .name("user")
                .description("Who to pay")
                .kind(CommandOptionType::User)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("amount")
                .description("How many coins")
                .kind(CommandOptionType::Integer)
                .required(true)
        })
}

pub fn register_addmoney(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("addmoney")
        .description("Grant coins to a member (admin)")
        .create_option(|option| {
            option
                .name("user")
                .description("Who receives the coins")
                .kind(CommandOptionType::User)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("amount")
                .description("How many coins")
                .kind(CommandOptionType::Integer)
                .required(true)
        })
}

pub async fn run_balance(bot: &Bot, who: &Invoker) -> Result<String, CoreError> {
    let balance = bot.economy.balance(&who.server(), &who.user_id()).await;
    Ok(format!("💰 You have **{balance}** coins."))
}

pub async fn run_work(bot: &Bot, who: &Invoker) -> Result<String, CoreError> {
    let earn = bot
        .economy
        .claim_work(&who.server(), &who.user_id(), Utc::now())
        .await?;
    Ok(format!("🛠️ You earned **{earn}** coins!"))
}

pub async fn run_daily(bot: &Bot, who: &Invoker) -> Result<String, CoreError> {
    let reward = bot
        .economy
        .claim_daily(&who.server(), &who.user_id(), Utc::now())
        .await?;
    Ok(format!("🎁 +{reward} coins!"))
}

pub async fn run_weekly(bot: &Bot, who: &Invoker) -> Result<String, CoreError> {
    let reward = bot
        .economy
        .claim_weekly(&who.server(), &who.user_id(), Utc::now())
        .await?;
    Ok(format!("💎 +{reward} coins!"))
}

pub async fn run_pay(
    options: &[CommandDataOption],
    bot: &Bot,
    who: &Invoker,
) -> Result<String, CoreError> {
    let target = req_user(options, "user")?;
    let amount = positive_amount(req_integer(options, "amount")?, "amount")?;

    bot.economy
        .transfer(
            &who.server(),
            &who.user_id(),
            &target.id.to_string(),
            amount,
            Utc::now(),
        )
        .await?;
    Ok(format!("💸 Sent {amount} coins to {}", target.tag()))
}

pub async fn run_addmoney(
    options: &[CommandDataOption],
    bot: &Bot,
    who: &Invoker,
) -> Result<String, CoreError> {
    let target = req_user(options, "user")?;
    let amount = positive_amount(req_integer(options, "amount")?, "amount")?;

    bot.economy
        .credit(&who.server(), &target.id.to_string(), amount)
        .await?;
    Ok(format!("💵 Added {amount} coins to {}", target.tag()))
}
