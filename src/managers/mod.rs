pub mod economy;
pub mod moderation;
pub mod panel;
pub mod shop;
pub mod store;
pub mod tickets;
pub mod widgets;
