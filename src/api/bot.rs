use std::sync::Arc;

use color_eyre::Result;
use serenity::model::application::command::Command;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::prelude::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::user::User;
use serenity::{
    async_trait,
    model::prelude::{
        component::ComponentType,
        interaction::{Interaction, InteractionResponseType},
        Activity, GuildId, Ready,
    },
    prelude::{Context, EventHandler},
};
use tracing::{info, warn};

use crate::commands;
use crate::error::CoreError;
use crate::managers::economy::EconomyManager;
use crate::managers::moderation::ModerationManager;
use crate::managers::panel::PanelManager;
use crate::managers::shop::ShopManager;
use crate::managers::store::DocumentStore;
use crate::managers::tickets::TicketManager;
use crate::managers::widgets::WidgetManager;
use crate::settings::Settings;
use crate::util::response;

/// Commands the router refuses to dispatch for non-admins. The core itself
/// never re-checks this; gating lives here, before any manager is touched.
const ADMIN_COMMANDS: &[&str] = &[
    "warn",
    "kick",
    "ban",
    "mute",
    "unmute",
    "addmoney",
    "additem",
    "deleteitem",
    "addwidget",
    "delwidget",
    "addticketpanel",
    "addadmin",
    "removeadmin",
    "close",
];

/// Caller identity handed to every command: which server, which user, and
/// whether the router considers them an admin.
pub struct Invoker {
    pub guild_id: GuildId,
    pub user: User,
    pub is_admin: bool,
}

impl Invoker {
    pub fn server(&self) -> String {
        self.guild_id.to_string()
    }

    pub fn user_id(&self) -> String {
        self.user.id.to_string()
    }

    pub fn tag(&self) -> String {
        self.user.tag()
    }
}

pub struct Bot {
    pub settings: Settings,
    pub store: Arc<DocumentStore>,
    pub economy: EconomyManager,
    pub shop: ShopManager,
    pub tickets: TicketManager,
    pub moderation: ModerationManager,
    pub widgets: WidgetManager,
    pub panel: PanelManager,
}

impl Bot {
    pub fn new(settings: Settings) -> Self {
        let store = Arc::new(DocumentStore::new(&settings.data_file));
        Self {
            economy: EconomyManager::new(Arc::clone(&store)),
            shop: ShopManager::new(Arc::clone(&store)),
            tickets: TicketManager::new(Arc::clone(&store)),
            moderation: ModerationManager::new(Arc::clone(&store)),
            widgets: WidgetManager::new(Arc::clone(&store)),
            panel: PanelManager::new(Arc::clone(&store)),
            store,
            settings,
        }
    }
}

#[async_trait]
impl EventHandler for Bot {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected", ready.user.name);
        ctx.set_activity(Activity::watching(&self.settings.activity.description))
            .await;

        let commands = Command::set_global_application_commands(&ctx.http, |commands| {
            commands
                .create_application_command(|cmd| commands::info::register_help(cmd))
                .create_application_command(|cmd| commands::info::register_info(cmd))
                .create_application_command(|cmd| commands::panel::register_panelogon(cmd))
                .create_application_command(|cmd| commands::panel::register_addadmin(cmd))
                .create_application_command(|cmd| commands::panel::register_removeadmin(cmd))
                .create_application_command(|cmd| commands::moderation::register_warn(cmd))
                .create_application_command(|cmd| commands::moderation::register_kick(cmd))
                .create_application_command(|cmd| commands::moderation::register_ban(cmd))
                .create_application_command(|cmd| commands::moderation::register_mute(cmd))
                .create_application_command(|cmd| commands::moderation::register_unmute(cmd))
                .create_application_command(|cmd| commands::economy::register_balance(cmd))
                .create_application_command(|cmd| commands::economy::register_work(cmd))
                .create_application_command(|cmd| commands::economy::register_daily(cmd))
                .create_application_command(|cmd| commands::economy::register_weekly(cmd))
                .create_application_command(|cmd| commands::economy::register_pay(cmd))
                .create_application_command(|cmd| commands::economy::register_addmoney(cmd))
                .create_application_command(|cmd| commands::shop::register_shop(cmd))
                .create_application_command(|cmd| commands::shop::register_buy(cmd))
                .create_application_command(|cmd| commands::shop::register_additem(cmd))
                .create_application_command(|cmd| commands::shop::register_deleteitem(cmd))
                .create_application_command(|cmd| commands::tickets::register_ticket(cmd))
                .create_application_command(|cmd| commands::tickets::register_close(cmd))
                .create_application_command(|cmd| commands::tickets::register_addticketpanel(cmd))
                .create_application_command(|cmd| commands::widgets::register_addwidget(cmd))
                .create_application_command(|cmd| commands::widgets::register_delwidget(cmd))
        })
        .await
        .unwrap_or_else(|why| {
            warn!("Cannot register commands: {:?}", why);
            Vec::new()
        });

        info!("Registered {} commands", commands.len());
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::ApplicationCommand(cmd) => {
                if let Err(why) = self.handle_slash(&ctx, cmd).await {
                    warn!("Error handling slash command: {:?}", why);
                }
            }
            Interaction::MessageComponent(component) => {
                if let Err(why) = self.handle_button(&ctx, component).await {
                    warn!("Error handling component: {:?}", why);
                }
            }
            _ => {}
        }
    }
}

impl Bot {
    async fn handle_slash(&self, ctx: &Context, cmd: ApplicationCommandInteraction) -> Result<()> {
        info!("Command: {:?}", cmd.data.name);

        let Some(guild_id) = cmd.guild_id else {
            return respond(ctx, &cmd, "This bot only works inside a server.".to_owned()).await;
        };
        let is_admin = cmd
            .member
            .as_ref()
            .and_then(|member| member.permissions)
            .map(|perms| perms.administrator() || perms.manage_guild())
            .unwrap_or(false);
        let who = Invoker {
            guild_id,
            user: cmd.user.clone(),
            is_admin,
        };

        let name = cmd.data.name.as_str();
        let outcome = if ADMIN_COMMANDS.contains(&name) && !who.is_admin {
            Err(CoreError::PermissionDenied)
        } else {
            self.dispatch(name, ctx, &cmd, &who).await
        };

        let content = match outcome {
            Ok(content) => content,
            Err(err) => {
                if !err.is_domain() {
                    warn!("command {name} failed: {err}");
                }
                response::error_line(&err)
            }
        };

        respond(ctx, &cmd, content).await
    }

    async fn dispatch(
        &self,
        name: &str,
        ctx: &Context,
        cmd: &ApplicationCommandInteraction,
        who: &Invoker,
    ) -> std::result::Result<String, CoreError> {
        let options = &cmd.data.options;
        match name {
            "help" => Ok(commands::info::run_help()),
            "info" => Ok(commands::info::run_info()),
            "panelogon" => commands::panel::run_panelogon(options, self, who).await,
            "addadmin" => commands::panel::run_addadmin(options, self, who).await,
            "removeadmin" => commands::panel::run_removeadmin(options, self, who).await,
            "warn" => commands::moderation::run_warn(options, self, who).await,
            "kick" => commands::moderation::run_kick(options, ctx, self, who).await,
            "ban" => commands::moderation::run_ban(options, ctx, self, who).await,
            "mute" => commands::moderation::run_mute(options, self, who).await,
            "unmute" => commands::moderation::run_unmute(options, self, who).await,
            "balance" => commands::economy::run_balance(self, who).await,
            "work" => commands::economy::run_work(self, who).await,
            "daily" => commands::economy::run_daily(self, who).await,
            "weekly" => commands::economy::run_weekly(self, who).await,
            "pay" => commands::economy::run_pay(options, self, who).await,
            "addmoney" => commands::economy::run_addmoney(options, self, who).await,
            "shop" => commands::shop::run_shop(self, who).await,
            "buy" => commands::shop::run_buy(options, ctx, self, who).await,
            "additem" => commands::shop::run_additem(options, self, who).await,
            "deleteitem" => commands::shop::run_deleteitem(options, self, who).await,
            "ticket" => commands::tickets::open_ticket(ctx, self, who).await,
            "close" => commands::tickets::run_close(ctx, self, who, cmd.channel_id).await,
            "addticketpanel" => {
                commands::tickets::run_addticketpanel(ctx, self, who, cmd.channel_id).await
            }
            "addwidget" => {
                commands::widgets::run_addwidget(options, ctx, self, who, cmd.channel_id).await
            }
            "delwidget" => commands::widgets::run_delwidget(options, self, who).await,
            _ => Err(CoreError::Validation("unknown command".to_owned())),
        }
    }

    async fn handle_button(&self, ctx: &Context, int: MessageComponentInteraction) -> Result<()> {
        if int.data.component_type != ComponentType::Button {
            return Ok(());
        }
        if int.data.custom_id != commands::tickets::OPEN_BUTTON_ID {
            return Ok(());
        }

        let Some(guild_id) = int.guild_id else {
            return Ok(());
        };
        let who = Invoker {
            guild_id,
            user: int.user.clone(),
            is_admin: false,
        };

        let content = match commands::tickets::open_ticket(ctx, self, &who).await {
            Ok(content) => content,
            Err(err) => {
                if !err.is_domain() {
                    warn!("ticket button failed: {err}");
                }
                response::error_line(&err)
            }
        };

        let res = int
            .create_interaction_response(&ctx.http, |r| {
                r.kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|d| d.content(content).ephemeral(true))
            })
            .await;
        if let Err(why) = res {
            warn!("Cannot respond to ticket button: {:?}", why);
        }
        Ok(())
    }
}

async fn respond(
    ctx: &Context,
    cmd: &ApplicationCommandInteraction,
    content: String,
) -> Result<()> {
    let res = cmd
        .create_interaction_response(&ctx.http, |res| {
            res.kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| message.content(content).ephemeral(true))
        })
        .await;
    if let Err(why) = res {
        warn!("Cannot respond to command: {:?}", why);
    }
    Ok(())
}
