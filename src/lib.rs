pub mod bot;
pub mod catalog;
pub mod config;
pub mod content;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod name;
pub mod telegram;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_BOT: &str = "bot";
pub const TARGET_CONTENT: &str = "content";
