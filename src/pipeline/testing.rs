//! In-memory fakes for pipeline tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result, SendError};
use crate::models::{Config, GiftCard, Snapshot};
use crate::services::{Browser, MessageSender, Page, WaitCondition};
use crate::storage::SnapshotStore;

/// What a scripted page does on one navigation.
#[derive(Debug, Clone)]
pub enum Step {
    /// Navigation times out
    Timeout,
    /// Navigation fails with a non-timeout error
    Fatal,
    /// Navigation loads this HTML
    Html(String),
}

/// Render a shop page listing `cards`.
pub fn shop_page(cards: &[GiftCard]) -> String {
    let rows: String = cards
        .iter()
        .map(|c| {
            format!(
                r#"<tr><td><span class="hidden-xs">{}</span></td><td class="text-right warning"><span>{}</span><span>/</span><span>{}</span></td><td><small class="availability"><span>{}</span></small></td></tr>"#,
                c.name, c.price, c.save_percent, c.quantity
            )
        })
        .collect();
    format!(
        r#"<html><body><div data-controller="buy-shop"><table><tbody>{rows}</tbody></table></div></body></html>"#
    )
}

#[derive(Default)]
struct BrowserState {
    scripts: HashMap<String, Vec<Step>>,
    navigations: HashMap<String, usize>,
    captures: Vec<PathBuf>,
    pages_opened: usize,
    waits_time_out: bool,
}

/// Browser whose pages replay a per-URL script of navigation steps.
///
/// Once a script runs out its last step repeats.
#[derive(Clone, Default)]
pub struct ScriptedBrowser {
    state: Arc<Mutex<BrowserState>>,
}

impl ScriptedBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, url: &str, steps: Vec<Step>) {
        let mut state = self.state.lock().unwrap();
        state.scripts.insert(url.to_string(), steps);
        state.navigations.remove(url);
    }

    /// Make every readiness wait fail with a wait timeout.
    pub fn stall_waits(&self) {
        self.state.lock().unwrap().waits_time_out = true;
    }

    pub fn navigations(&self, url: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .navigations
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    pub fn captures(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().captures.clone()
    }

    pub fn pages_opened(&self) -> usize {
        self.state.lock().unwrap().pages_opened
    }
}

#[async_trait]
impl Browser for ScriptedBrowser {
    async fn new_page(&self) -> Result<Box<dyn Page>> {
        self.state.lock().unwrap().pages_opened += 1;
        Ok(Box::new(ScriptedPage {
            state: Arc::clone(&self.state),
            body: None,
        }))
    }
}

struct ScriptedPage {
    state: Arc<Mutex<BrowserState>>,
    body: Option<String>,
}

#[async_trait]
impl Page for ScriptedPage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let step = {
            let mut state = self.state.lock().unwrap();
            let count = state.navigations.entry(url.to_string()).or_insert(0);
            let index = *count;
            *count += 1;
            state
                .scripts
                .get(url)
                .and_then(|steps| steps.get(index).or(steps.last()))
                .cloned()
                .unwrap_or(Step::Fatal)
        };

        self.body = None;
        match step {
            Step::Timeout => Err(AppError::NavigationTimeout {
                url: url.to_string(),
                timeout_secs: timeout.as_secs(),
            }),
            Step::Fatal => Err(AppError::Io(std::io::Error::other("browser crashed"))),
            Step::Html(body) => {
                self.body = Some(body);
                Ok(())
            }
        }
    }

    async fn wait_for(&mut self, condition: &WaitCondition, timeout: Duration) -> Result<()> {
        if self.state.lock().unwrap().waits_time_out {
            return Err(AppError::WaitTimeout {
                condition: condition.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        self.body
            .clone()
            .ok_or_else(|| AppError::extraction("about:blank", "no page loaded"))
    }

    async fn capture_diagnostic(&self, path: &Path) -> Result<()> {
        self.state.lock().unwrap().captures.push(path.to_path_buf());
        Ok(())
    }
}

/// Snapshot store held in memory.
#[derive(Clone, Default)]
pub struct MemoryStore {
    snapshot: Arc<Mutex<Snapshot>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn with(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(snapshot)),
            saves: Arc::default(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> Result<Snapshot> {
        Ok(self.snapshot())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        *self.snapshot.lock().unwrap() = snapshot.clone();
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}

/// Sender that records messages and always succeeds.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<String>>,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, _channel_id: &str, text: &str) -> std::result::Result<(), SendError> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Config with the given sources and no real waiting.
pub fn fast_config(sources: &[&str]) -> Config {
    let mut config = Config::default();
    config.sources = sources.iter().map(|s| s.to_string()).collect();
    config.retry.backoff_secs = 0;
    config.browser.settle_delay_ms = 0;
    config.browser.diagnostics_dir = PathBuf::from("diagnostics");
    config
}
