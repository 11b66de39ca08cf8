// src/error.rs

//! Unified error handling for the monitor.

use std::fmt;

use thiserror::Error;

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Page navigation did not finish in time
    #[error("Navigation to {url} timed out after {timeout_secs}s")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    /// A page readiness condition was not met in time
    #[error("Timed out after {timeout_secs}s waiting for {condition}")]
    WaitTimeout { condition: String, timeout_secs: u64 },

    /// The page could not be turned into gift card records
    #[error("Extraction failed for {url}: {message}")]
    Extraction { url: String, message: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an extraction error for a page.
    pub fn extraction(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Extraction {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error is a timeout worth retrying after a backoff.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::NavigationTimeout { .. } | Self::WaitTimeout { .. } => true,
            Self::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Delivery failure reported by a message sender.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The destination channel does not exist or is not visible to the bot
    #[error("channel {channel_id} not found")]
    ChannelNotFound { channel_id: String },

    /// The bot may not post in the destination channel
    #[error("missing permission to send messages in channel {channel_id}")]
    Forbidden { channel_id: String },

    /// Transport or platform failure while delivering
    #[error("delivery failed: {0}")]
    Delivery(String),
}

impl SendError {
    /// Whether the failure stems from channel configuration rather than transport.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ChannelNotFound { .. } | Self::Forbidden { .. })
    }
}

impl From<reqwest::Error> for SendError {
    fn from(e: reqwest::Error) -> Self {
        Self::Delivery(e.to_string())
    }
}
