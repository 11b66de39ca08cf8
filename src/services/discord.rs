// src/services/discord.rs

//! Message delivery to a Discord channel over the REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result, SendError};
use crate::utils::http::create_api_client;

const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Capability to post a text message to a channel.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, channel_id: &str, text: &str) -> std::result::Result<(), SendError>;
}

/// The bot account the credential belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: String,
    pub username: String,
}

#[derive(Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

/// Discord bot client.
#[derive(Clone)]
pub struct DiscordSender {
    client: Client,
    api_base: String,
    token: String,
}

impl DiscordSender {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: create_api_client(API_TIMEOUT)?,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Verify the credential and return the bot account.
    ///
    /// Serves as the readiness signal before the first scheduled check.
    pub async fn ready(&self) -> Result<BotUser> {
        let url = format!("{}/users/@me", self.api_base);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AppError::config("Discord rejected the bot token"));
        }

        let user: BotUser = response.error_for_status()?.json().await?;
        log::info!("Bot {} ({}) is connected to Discord", user.username, user.id);
        Ok(user)
    }
}

#[async_trait]
impl MessageSender for DiscordSender {
    async fn send(&self, channel_id: &str, text: &str) -> std::result::Result<(), SendError> {
        let url = format!("{}/channels/{}/messages", self.api_base, channel_id);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&CreateMessage { content: text })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(SendError::ChannelNotFound {
                channel_id: channel_id.to_string(),
            }),
            StatusCode::FORBIDDEN => Err(SendError::Forbidden {
                channel_id: channel_id.to_string(),
            }),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(SendError::Delivery(format!(
                    "unexpected status {status}: {body}"
                )))
            }
        }
    }
}
