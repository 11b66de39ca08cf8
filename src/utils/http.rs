// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::BrowserConfig;

/// Create a configured asynchronous HTTP client for page loads.
///
/// The navigation timeout is enforced per request by the caller, so the
/// client itself only bounds connection setup.
pub fn create_async_client(config: &BrowserConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .connect_timeout(Duration::from_secs(config.navigation_timeout_secs))
        .build()?;
    Ok(client)
}

/// Create a client for chat API calls with an overall request timeout.
pub fn create_api_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("cardwatch/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?;
    Ok(client)
}
