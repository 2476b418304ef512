pub mod economy;
pub mod info;
pub mod moderation;
pub mod panel;
pub mod shop;
pub mod tickets;
pub mod widgets;
