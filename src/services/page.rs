// src/services/page.rs

//! Page fetching capability.
//!
//! A [`Browser`] hands out one [`Page`] per run; the page is reused for every
//! source in that run. [`HttpBrowser`] is the shipped implementation and loads
//! pages over plain HTTP.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::BrowserConfig;
use crate::utils::http::create_async_client;

/// A readiness condition a page can be waited on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    /// The page has stopped loading resources
    NetworkIdle,
    /// An element matching the CSS selector is present
    Visible(String),
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkIdle => write!(f, "network idle"),
            Self::Visible(selector) => write!(f, "selector {selector}"),
        }
    }
}

/// Factory for pages; one page is opened per run.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn new_page(&self) -> Result<Box<dyn Page>>;
}

/// A single page session that navigates between sources.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate to `url`; fails with [`AppError::NavigationTimeout`] when slow.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Wait for a readiness condition; fails with [`AppError::WaitTimeout`].
    async fn wait_for(&mut self, condition: &WaitCondition, timeout: Duration) -> Result<()>;

    /// Serialized DOM of the current page.
    async fn content(&self) -> Result<String>;

    /// Write a debugging capture of the current page to `path`.
    async fn capture_diagnostic(&self, path: &Path) -> Result<()>;
}

/// Browser backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpBrowser {
    client: Client,
}

impl HttpBrowser {
    pub fn new(config: &BrowserConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn new_page(&self) -> Result<Box<dyn Page>> {
        Ok(Box::new(HttpPage {
            client: self.client.clone(),
            loaded: None,
            failure: None,
        }))
    }
}

/// Page state for [`HttpBrowser`]: the last successfully loaded document,
/// or why the last navigation failed.
pub struct HttpPage {
    client: Client,
    loaded: Option<LoadedPage>,
    failure: Option<String>,
}

struct LoadedPage {
    url: String,
    body: String,
}

impl HttpPage {
    fn loaded(&self) -> Result<&LoadedPage> {
        self.loaded
            .as_ref()
            .ok_or_else(|| AppError::extraction("about:blank", "no page has been loaded"))
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String> {
        let timed_out = || AppError::NavigationTimeout {
            url: url.to_string(),
            timeout_secs: timeout.as_secs(),
        };

        let fetch = async {
            let response = self.client.get(url).send().await?.error_for_status()?;
            response.text().await
        };

        match tokio::time::timeout(timeout, fetch).await {
            Err(_) => Err(timed_out()),
            Ok(Err(e)) if e.is_timeout() => Err(timed_out()),
            Ok(result) => Ok(result?),
        }
    }

    /// What a diagnostic capture should contain for the current state.
    fn capture_contents(&self) -> String {
        match (&self.loaded, &self.failure) {
            (Some(page), _) => page.body.clone(),
            (None, Some(failure)) => format!("<!-- {failure} -->\n"),
            (None, None) => "<!-- no page has been loaded -->\n".to_string(),
        }
    }
}

#[async_trait]
impl Page for HttpPage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()> {
        self.loaded = None;
        self.failure = None;

        let body = match self.fetch(url, timeout).await {
            Ok(body) => body,
            Err(e) => {
                self.failure = Some(format!("failed to load {url}: {e}"));
                return Err(e);
            }
        };

        log::debug!("Loaded {} ({} bytes)", url, body.len());
        self.loaded = Some(LoadedPage {
            url: url.to_string(),
            body,
        });
        Ok(())
    }

    async fn wait_for(&mut self, condition: &WaitCondition, timeout: Duration) -> Result<()> {
        let timed_out = || AppError::WaitTimeout {
            condition: condition.to_string(),
            timeout_secs: timeout.as_secs(),
        };

        // A fetched document is static, so a condition either holds now or never will.
        let Some(page) = self.loaded.as_ref() else {
            return Err(timed_out());
        };

        match condition {
            WaitCondition::NetworkIdle => Ok(()),
            WaitCondition::Visible(selector) => {
                let sel = Selector::parse(selector)
                    .map_err(|e| AppError::selector(selector.as_str(), format!("{e:?}")))?;
                let document = Html::parse_document(&page.body);
                if document.select(&sel).next().is_some() {
                    Ok(())
                } else {
                    log::debug!("{} not present on {}", condition, page.url);
                    Err(timed_out())
                }
            }
        }
    }

    async fn content(&self) -> Result<String> {
        Ok(self.loaded()?.body.clone())
    }

    async fn capture_diagnostic(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, self.capture_contents()).await?;
        Ok(())
    }
}
