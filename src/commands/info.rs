use serenity::builder::CreateApplicationCommand;

pub fn register_help(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("help").description("List the available commands")
}

pub fn register_info(cmd: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    cmd.name("info").description("About this bot")
}

pub fn run_help() -> String {
    "Commands:\n\
     Moderation: warn kick ban mute unmute panelogon addadmin removeadmin\n\
     Economy: balance work daily weekly pay addmoney\n\
     Shop: shop buy additem deleteitem\n\
     Tickets: ticket close addticketpanel\n\
     Widgets: addwidget delwidget"
        .to_owned()
}

pub fn run_info() -> String {
    "Steward — moderation, economy, shop and tickets, with a web panel.".to_owned()
}
