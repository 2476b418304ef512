pub mod document;
pub mod economy;
pub mod moderation;
pub mod server;
pub mod shop;
pub mod tickets;
pub mod widget;
