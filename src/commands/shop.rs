use chrono::Utc;
use serenity::builder::CreateApplicationCommand;
use serenity::model::prelude::command::CommandOptionType;
use serenity::model::prelude::interaction::application_command::CommandDataOption;
use serenity::model::prelude::RoleId;
use serenity::prelude::Context;
use tracing::warn;

use crate::api::bot::{Bot, Invoker};
use crate::api::schema::shop::NewItem;
use crate::error::CoreError;
use crate::util::{
    non_negative_price, opt_bool, opt_role, opt_string, position_to_index, req_integer, req_string,
};

pub fn register_shop(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("shop").description("Browse this server's shop")
}

pub fn register_buy(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("buy")
        .description("Buy an item from the shop")
        .create_option(|option| {
            option
                .name("item")
                .description("Item number as shown by /shop")
                .kind(CommandOptionType::Integer)
                .required(true)
        })
}

pub fn register_additem(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("additem")
        .description("Add an item to the shop (admin)")
        .create_option(|option| {
            option
                .name("name")
                .description("Item name")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("price")
                .description("Item price")
                .kind(CommandOptionType::Integer)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("desc")
                .description("Item description")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .create_option(|option| {
            option
                .name("giverole")
                .description("Grant a role on purchase?")
                .kind(CommandOptionType::Boolean)
                .required(false)
        })
        .create_option(|option| {
            option
                .name("role")
                .description("Role granted on purchase")
                .kind(CommandOptionType::Role)
                .required(false)
        })
        .create_option(|option| {
            option
                .name("requiresrole")
                .description("Role required to buy")
                .kind(CommandOptionType::Role)
                .required(false)
        })
}

pub fn register_deleteitem(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("deleteitem")
        .description("Remove an item from the shop (admin)")
        .create_option(|option| {
            option
                .name("id")
                .description("Item number as shown by /shop")
                .kind(CommandOptionType::Integer)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("confirm")
                .description("Really delete it?")
                .kind(CommandOptionType::Boolean)
                .required(true)
        })
}

pub async fn run_shop(bot: &Bot, who: &Invoker) -> Result<String, CoreError> {
    let items = bot.shop.list(&who.server()).await;
    if items.is_empty() {
        return Ok("🛒 The shop is empty.".to_owned());
    }

    let mut text = String::from("🛒 **Server shop:**\n\n");
    for (index, item) in items.iter().enumerate() {
        text.push_str(&format!(
            "**{}. {}** — {} coins\n{}\n\n",
            index + 1,
            item.name,
            item.price,
            item.description
        ));
    }
    Ok(text)
}

pub async fn run_buy(
    options: &[CommandDataOption],
    ctx: &Context,
    bot: &Bot,
    who: &Invoker,
) -> Result<String, CoreError> {
    let index = position_to_index(req_integer(options, "item")?)?;

    // the buyer's roles are read once, up front, and handed to the catalog
    // as a plain predicate
    let mut member = who
        .guild_id
        .member(&ctx.http, who.user.id)
        .await
        .map_err(|err| CoreError::Actuator(err.to_string()))?;
    let roles = member.roles.clone();
    let has_role = |role_id: &str| {
        role_id
            .parse::<u64>()
            .map(|id| roles.contains(&RoleId(id)))
            .unwrap_or(false)
    };

    let receipt = bot
        .shop
        .purchase(&who.server(), &who.user_id(), index, has_role, Utc::now())
        .await?;

    // best effort: a failed grant never rolls back the committed debit
    if let Some(role_id) = &receipt.pending_role {
        match role_id.parse::<u64>() {
            Ok(id) => {
                if let Err(err) = member.add_role(&ctx.http, RoleId(id)).await {
                    warn!("could not grant role {role_id} after purchase: {err}");
                }
            }
            Err(_) => warn!("item {} carries a malformed role id", receipt.item.name),
        }
    }

    Ok(format!("🛒 Bought: **{}**", receipt.item.name))
}

pub async fn run_additem(
    options: &[CommandDataOption],
    bot: &Bot,
    who: &Invoker,
) -> Result<String, CoreError> {
    let name = req_string(options, "name")?;
    let price = non_negative_price(req_integer(options, "price")?)?;

    let item = NewItem {
        name: name.to_owned(),
        description: opt_string(options, "desc").unwrap_or_default().to_owned(),
        price,
        grants_role: opt_bool(options, "giverole").unwrap_or(false),
        role_id: opt_role(options, "role")
            .map(|role| role.id.to_string())
            .unwrap_or_default(),
        required_role_id: opt_role(options, "requiresrole")
            .map(|role| role.id.to_string())
            .unwrap_or_default(),
    };

    let item = bot.shop.add_item(&who.server(), item, Utc::now()).await?;
    Ok(format!("✅ Added item: {}", item.name))
}

pub async fn run_deleteitem(
    options: &[CommandDataOption],
    bot: &Bot,
    who: &Invoker,
) -> Result<String, CoreError> {
    let index = position_to_index(req_integer(options, "id")?)?;
    if !opt_bool(options, "confirm").unwrap_or(false) {
        return Err(CoreError::Validation(
            "confirm the deletion to proceed".to_owned(),
        ));
    }

    let removed = bot.shop.remove_item(&who.server(), index).await?;
    Ok(format!("🗑️ Removed item: {}", removed.name))
}
