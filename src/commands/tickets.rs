use chrono::Utc;
use serenity::builder::CreateApplicationCommand;
use serenity::model::channel::ChannelType;
use serenity::model::prelude::component::ButtonStyle;
use serenity::model::prelude::{ChannelId, ReactionType};
use serenity::model::user::User;
use serenity::prelude::Context;
use tracing::warn;

use crate::api::bot::{Bot, Invoker};
use crate::error::CoreError;

/// Button id the panel message carries; the component handler routes it back
/// into [`open_ticket`].
pub const OPEN_BUTTON_ID: &str = "ticket/open";

pub fn register_ticket(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("ticket").description("Open a support ticket")
}

pub fn register_close(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("close")
        .description("Close the ticket in this channel (admin)")
}

pub fn register_addticketpanel(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("addticketpanel")
        .description("Post an open-a-ticket panel in this channel (admin)")
}

/// Shared by the `/ticket` command and the panel button. The channel is
/// created first; only once it exists does the directory record the ticket,
/// so a failed creation leaves no orphan entry.
pub async fn open_ticket(ctx: &Context, bot: &Bot, who: &Invoker) -> Result<String, CoreError> {
    let channel = who
        .guild_id
        .create_channel(&ctx.http, |c| {
            c.name(ticket_channel_name(&who.user))
                .kind(ChannelType::Text)
                .topic("Support ticket")
        })
        .await
        .map_err(|err| CoreError::Actuator(err.to_string()))?;

    let id = match bot
        .tickets
        .open(
            &who.server(),
            &who.user_id(),
            &channel.id.to_string(),
            Utc::now(),
        )
        .await
    {
        Ok(id) => id,
        Err(err) => {
            // the record never committed; try not to leave the channel behind
            if let Err(del_err) = channel.id.delete(&ctx.http).await {
                warn!("could not clean up ticket channel {}: {del_err}", channel.id);
            }
            return Err(err);
        }
    };

    let welcome = format!(
        "🎫 Ticket **#{id}** opened by <@{}>. A moderator will be with you shortly.",
        who.user.id
    );
    if let Err(err) = channel.id.send_message(&ctx.http, |m| m.content(welcome)).await {
        warn!("could not post the ticket welcome message: {err}");
    }

    Ok(format!("🎫 Ticket **#{id}** opened: <#{}>", channel.id))
}

/// Close follows the directory contract: resolve the ticket, delete the
/// channel, and only then commit the close. A channel the platform refuses
/// to delete keeps its ticket open.
pub async fn run_close(
    ctx: &Context,
    bot: &Bot,
    who: &Invoker,
    channel_id: ChannelId,
) -> Result<String, CoreError> {
    let channel_ref = channel_id.to_string();
    if bot.tickets.find(&who.server(), &channel_ref).await.is_none() {
        return Err(CoreError::NotATicketChannel);
    }

    channel_id
        .delete(&ctx.http)
        .await
        .map_err(|err| CoreError::Actuator(err.to_string()))?;

    let id = bot
        .tickets
        .close(&who.server(), &channel_ref, &who.tag(), Utc::now())
        .await?;
    Ok(format!("🔒 Ticket **#{id}** closed"))
}

pub async fn run_addticketpanel(
    ctx: &Context,
    _bot: &Bot,
    _who: &Invoker,
    channel_id: ChannelId,
) -> Result<String, CoreError> {
    channel_id
        .send_message(&ctx.http, |m| {
            m.content("Need help? Open a ticket and a moderator will take it from there.")
                .components(|c| {
                    c.create_action_row(|row| {
                        row.create_button(|b| {
                            b.label("Open ticket")
                                .style(ButtonStyle::Primary)
                                .custom_id(OPEN_BUTTON_ID)
                                .emoji(ReactionType::Unicode("🎫".to_owned()))
                        })
                    })
                })
        })
        .await
        .map_err(|err| CoreError::Actuator(err.to_string()))?;

    Ok("✅ Ticket panel created".to_owned())
}

fn ticket_channel_name(user: &User) -> String {
    let slug: String = user
        .name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    if slug.is_empty() {
        format!("ticket-{}", user.id)
    } else {
        format!("ticket-{slug}")
    }
}

#[cfg(test)]
mod tests {
    use super::ticket_channel_name;

    #[test]
    fn channel_names_survive_odd_usernames() {
        let mut user = serenity::model::user::User::default();
        user.name = "Zażółć 超 Gęślą".to_owned();
        assert_eq!(ticket_channel_name(&user), "ticket-zagl");

        user.name = "💀💀💀".to_owned();
        assert_eq!(ticket_channel_name(&user), format!("ticket-{}", user.id));
    }
}
