//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Shop pages to monitor, processed in order
    #[serde(default = "defaults::sources")]
    pub sources: Vec<String>,

    /// Page loading behavior
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Per-source retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Check interval
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Message formatting and delivery
    #[serde(default)]
    pub notify: NotifyConfig,

    /// File locations
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(AppError::config("No sources defined"));
        }
        for source in &self.sources {
            let url = url::Url::parse(source)?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(AppError::config(format!(
                    "source '{source}' must be an http(s) URL"
                )));
            }
        }
        if self.browser.user_agent.trim().is_empty() {
            return Err(AppError::config("browser.user_agent is empty"));
        }
        if self.browser.navigation_timeout_secs == 0 {
            return Err(AppError::config(
                "browser.navigation_timeout_secs must be > 0",
            ));
        }
        if self.browser.wait_timeout_secs == 0 {
            return Err(AppError::config("browser.wait_timeout_secs must be > 0"));
        }
        if self.retry.max_attempts == 0 {
            return Err(AppError::config("retry.max_attempts must be > 0"));
        }
        if self.schedule.interval_secs == 0 {
            return Err(AppError::config("schedule.interval_secs must be > 0"));
        }
        if self.notify.max_message_len == 0 {
            return Err(AppError::config("notify.max_message_len must be > 0"));
        }
        if self.notify.chunk_budget > self.notify.max_message_len {
            return Err(AppError::config(
                "notify.chunk_budget must not exceed notify.max_message_len",
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: defaults::sources(),
            browser: BrowserConfig::default(),
            retry: RetryConfig::default(),
            schedule: ScheduleConfig::default(),
            notify: NotifyConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

/// Page loading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// User-Agent header sent with page requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Upper bound on a single page navigation
    #[serde(default = "defaults::navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Upper bound on each readiness wait
    #[serde(default = "defaults::wait_timeout")]
    pub wait_timeout_secs: u64,

    /// Pause after readiness waits before extracting
    #[serde(default = "defaults::settle_delay")]
    pub settle_delay_ms: u64,

    /// Where error page captures are written
    #[serde(default = "defaults::diagnostics_dir")]
    pub diagnostics_dir: PathBuf,
}

impl BrowserConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            navigation_timeout_secs: defaults::navigation_timeout(),
            wait_timeout_secs: defaults::wait_timeout(),
            settle_delay_ms: defaults::settle_delay(),
            diagnostics_dir: defaults::diagnostics_dir(),
        }
    }
}

/// Retry policy for a single source within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Fetch attempts per source per run
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Fixed pause after a timeout before the next attempt
    #[serde(default = "defaults::backoff")]
    pub backoff_secs: u64,
}

impl RetryConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            backoff_secs: defaults::backoff(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between the start of consecutive checks
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
        }
    }
}

/// Notification formatting and delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Hard size limit of a single message, in characters
    #[serde(default = "defaults::max_message_len")]
    pub max_message_len: usize,

    /// Size at which record lines start a new message
    #[serde(default = "defaults::chunk_budget")]
    pub chunk_budget: usize,

    /// Base URL of the Discord REST API
    #[serde(default = "defaults::api_base")]
    pub api_base: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            max_message_len: defaults::max_message_len(),
            chunk_budget: defaults::chunk_budget(),
            api_base: defaults::api_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// JSON file holding the last known listings
    #[serde(default = "defaults::snapshot_file")]
    pub snapshot_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            snapshot_file: defaults::snapshot_file(),
        }
    }
}

/// Bot credential and destination channel, read from the environment.
#[derive(Clone)]
pub struct Credentials {
    pub token: String,
    pub channel_id: String,
}

impl Credentials {
    pub const TOKEN_VAR: &'static str = "DISCORD_TOKEN";
    pub const CHANNEL_VAR: &'static str = "CHANNEL_ID";

    /// Read credentials from `DISCORD_TOKEN` and `CHANNEL_ID`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build credentials from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = required(&lookup, Self::TOKEN_VAR)?;
        let channel_id = required(&lookup, Self::CHANNEL_VAR)?;

        if channel_id.parse::<u64>().is_err() {
            return Err(AppError::config(format!(
                "{} must be a numeric channel id, got '{}'",
                Self::CHANNEL_VAR,
                channel_id
            )));
        }

        Ok(Self { token, channel_id })
    }
}

// Keeps the token out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .finish()
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::config(format!("{key} is not set")))
}

mod defaults {
    use std::path::PathBuf;

    pub fn sources() -> Vec<String> {
        vec!["https://www.cardyard.co.uk/shops/currys".into()]
    }

    // Browser defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
            .into()
    }
    pub fn navigation_timeout() -> u64 {
        90
    }
    pub fn wait_timeout() -> u64 {
        60
    }
    pub fn settle_delay() -> u64 {
        2000
    }
    pub fn diagnostics_dir() -> PathBuf {
        PathBuf::from(".")
    }

    // Retry defaults
    pub fn max_attempts() -> u32 {
        3
    }
    pub fn backoff() -> u64 {
        5
    }

    pub fn interval() -> u64 {
        600
    }

    // Notify defaults
    pub fn max_message_len() -> usize {
        2000
    }
    pub fn chunk_budget() -> usize {
        1900
    }
    pub fn api_base() -> String {
        "https://discord.com/api/v10".into()
    }

    pub fn snapshot_file() -> PathBuf {
        PathBuf::from("gift_card_data.json")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_sources() {
        let mut config = Config::default();
        config.sources.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_malformed_sources() {
        let mut config = Config::default();
        config.sources = vec!["not a url".into()];
        assert!(matches!(config.validate(), Err(AppError::Url(_))));

        config.sources = vec!["ftp://example.com/shop".into()];
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_budget_above_limit() {
        let mut config = Config::default();
        config.notify.chunk_budget = 2500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            sources = ["https://example.com/shops/a", "https://example.com/shops/b"]

            [retry]
            backoff_secs = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.backoff_secs, 1);
        assert_eq!(config.browser.navigation_timeout_secs, 90);
        assert_eq!(config.schedule.interval_secs, 600);
        assert_eq!(config.notify.max_message_len, 2000);
    }

    #[test]
    fn credentials_require_both_values() {
        assert!(Credentials::from_lookup(lookup(&[("DISCORD_TOKEN", "t")])).is_err());
        assert!(Credentials::from_lookup(lookup(&[("CHANNEL_ID", "123")])).is_err());
        assert!(
            Credentials::from_lookup(lookup(&[("DISCORD_TOKEN", "  "), ("CHANNEL_ID", "123")]))
                .is_err()
        );

        let creds = Credentials::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "secret-token"),
            ("CHANNEL_ID", "123"),
        ]))
        .unwrap();
        assert_eq!(creds.channel_id, "123");
        assert!(!format!("{creds:?}").contains("secret-token"));
    }

    #[test]
    fn credentials_reject_non_numeric_channel() {
        let result =
            Credentials::from_lookup(lookup(&[("DISCORD_TOKEN", "t"), ("CHANNEL_ID", "general")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
