// src/pipeline/check.rs

//! One gift card check across every monitored source.
//!
//! For each source the page is loaded and extracted with bounded retries:
//! timeouts back off and retry, an empty listing retries straight away, and
//! any other error aborts that source. Successful sources are diffed against
//! the previous snapshot and announced. The snapshot written at the end holds
//! only the sources that succeeded in this run.

use std::sync::Arc;

use chrono::Local;

use crate::error::Result;
use crate::models::{Config, GiftCard, Snapshot};
use crate::pipeline::diff::new_cards;
use crate::pipeline::notify::{NotifyReport, Notifier};
use crate::services::{Browser, Extractor, Page, SHOP_CONTAINER, WaitCondition};
use crate::storage::SnapshotStore;
use crate::utils::{diagnostic_path, truncate_chars};

/// Characters of page content logged when extraction fails.
const CONTENT_LOG_CHARS: usize = 1000;

/// Terminal state of one source within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    Success {
        attempts: u32,
        cards: usize,
        new_cards: usize,
        notify: NotifyReport,
    },
    ExhaustedRetries {
        attempts: u32,
    },
    FatalAbort {
        attempts: u32,
        error: String,
    },
}

impl SourceOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. }
            | Self::ExhaustedRetries { attempts }
            | Self::FatalAbort { attempts, .. } => *attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source: String,
    pub outcome: SourceOutcome,
}

/// Summary of a run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub sources: Vec<SourceReport>,
    /// Snapshot persisted at the end of the run
    pub snapshot: Snapshot,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.sources.iter().filter(|s| s.outcome.is_success()).count()
    }

    pub fn outcome(&self, source: &str) -> Option<&SourceOutcome> {
        self.sources
            .iter()
            .find(|s| s.source == source)
            .map(|s| &s.outcome)
    }
}

/// Runs checks. Owns every collaborator a run needs.
pub struct Checker {
    config: Arc<Config>,
    browser: Arc<dyn Browser>,
    store: Arc<dyn SnapshotStore>,
    notifier: Notifier,
    extractor: Extractor,
}

impl Checker {
    pub fn new(
        config: Arc<Config>,
        browser: Arc<dyn Browser>,
        store: Arc<dyn SnapshotStore>,
        notifier: Notifier,
    ) -> Result<Self> {
        Ok(Self {
            config,
            browser,
            store,
            notifier,
            extractor: Extractor::new()?,
        })
    }

    /// Check every source once and persist the resulting snapshot.
    ///
    /// Source failures are contained; only snapshot and browser errors fail
    /// the run.
    pub async fn run_once(&self) -> Result<RunReport> {
        log::info!("Starting gift card check");

        let previous = self.store.load().await?;
        let mut current = Snapshot::new();
        let mut page = self.browser.new_page().await?;
        let mut reports = Vec::with_capacity(self.config.sources.len());

        for source in &self.config.sources {
            let outcome = self
                .check_source(page.as_mut(), source, &previous, &mut current)
                .await;
            reports.push(SourceReport {
                source: source.clone(),
                outcome,
            });
        }

        self.store.save(&current).await?;

        let succeeded = reports.iter().filter(|r| r.outcome.is_success()).count();
        log::info!(
            "Gift card check completed ({}/{} sources succeeded)",
            succeeded,
            reports.len()
        );

        Ok(RunReport {
            sources: reports,
            snapshot: current,
        })
    }

    async fn check_source(
        &self,
        page: &mut dyn Page,
        source: &str,
        previous: &Snapshot,
        current: &mut Snapshot,
    ) -> SourceOutcome {
        let max_attempts = self.config.retry.max_attempts;

        for attempt in 1..=max_attempts {
            log::debug!(
                "Fetching data from {} (Attempt {}/{})",
                source,
                attempt,
                max_attempts
            );

            match self.fetch_cards(page, source).await {
                Ok(cards) if cards.is_empty() => {
                    log::warn!("No gift cards found on {}. Retrying...", source);
                }
                Ok(cards) => {
                    let fresh = new_cards(source, &cards, previous);
                    let notify = if fresh.is_empty() {
                        NotifyReport::default()
                    } else {
                        log::info!("Found {} new gift cards at {}", fresh.len(), source);
                        self.notifier.notify(source, &fresh).await
                    };

                    let outcome = SourceOutcome::Success {
                        attempts: attempt,
                        cards: cards.len(),
                        new_cards: fresh.len(),
                        notify,
                    };
                    current.insert(source, cards);
                    return outcome;
                }
                Err(e) if e.is_timeout() => {
                    if attempt < max_attempts {
                        log::warn!("Timeout error for {}: {}. Retrying...", source, e);
                        tokio::time::sleep(self.config.retry.backoff()).await;
                    } else {
                        log::warn!("Timeout error for {}: {}", source, e);
                    }
                }
                Err(e) => {
                    log::error!("Unexpected error processing {}: {:?}", source, e);
                    self.capture_diagnostic(&*page).await;
                    return SourceOutcome::FatalAbort {
                        attempts: attempt,
                        error: e.to_string(),
                    };
                }
            }
        }

        log::error!("Failed to load {} after {} attempts.", source, max_attempts);
        SourceOutcome::ExhaustedRetries {
            attempts: max_attempts,
        }
    }

    async fn fetch_cards(&self, page: &mut dyn Page, source: &str) -> Result<Vec<GiftCard>> {
        page.goto(source, self.config.browser.navigation_timeout())
            .await?;
        self.wait_for_page_load(page).await?;

        let html = page.content().await?;
        self.extractor.extract_html(source, &html).inspect_err(|e| {
            log::error!("Error during gift card extraction: {}", e);
            log::debug!(
                "Page content at time of error: {}...",
                truncate_chars(&html, CONTENT_LOG_CHARS)
            );
        })
    }

    /// Wait for the listing to render. A timeout is logged and extraction
    /// goes ahead regardless.
    async fn wait_for_page_load(&self, page: &mut dyn Page) -> Result<()> {
        let timeout = self.config.browser.wait_timeout();
        let conditions = [
            WaitCondition::NetworkIdle,
            WaitCondition::Visible(SHOP_CONTAINER.to_string()),
        ];

        for condition in &conditions {
            match page.wait_for(condition, timeout).await {
                Ok(()) => {}
                Err(e) if e.is_timeout() => {
                    log::warn!(
                        "Timeout waiting for page to load completely ({}). Proceeding with extraction anyway.",
                        e
                    );
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }

        tokio::time::sleep(self.config.browser.settle_delay()).await;
        Ok(())
    }

    async fn capture_diagnostic(&self, page: &dyn Page) {
        let path = diagnostic_path(
            &self.config.browser.diagnostics_dir,
            Local::now().naive_local(),
        );
        match page.capture_diagnostic(&path).await {
            Ok(()) => log::info!("Saved error capture to {}", path.display()),
            Err(e) => log::warn!("Failed to save error capture to {}: {}", path.display(), e),
        }
    }
}
