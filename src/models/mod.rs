// src/models/mod.rs

//! Domain models for the monitor.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod gift_card;
mod snapshot;

// Re-export all public types
pub use config::{
    BrowserConfig, Config, Credentials, NotifyConfig, PathsConfig, RetryConfig, ScheduleConfig,
};
pub use gift_card::{GiftCard, NOT_AVAILABLE};
pub use snapshot::Snapshot;
