//! Service layer for the monitor.
//!
//! This module contains the external capabilities and page parsing:
//! - Gift card extraction (`Extractor`)
//! - Page loading (`Browser`, `Page`, `HttpBrowser`)
//! - Message delivery (`MessageSender`, `DiscordSender`)

pub mod discord;
pub mod extract;
pub mod page;

pub use discord::{BotUser, DiscordSender, MessageSender};
pub use extract::{Extractor, SHOP_CONTAINER};
pub use page::{Browser, HttpBrowser, Page, WaitCondition};
