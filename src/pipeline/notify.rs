//! Notification formatting and chunked delivery.
//!
//! New cards for a source are rendered as a header line followed by one line
//! per card. Lines are grouped greedily into chunks below the chunk budget,
//! each chunk repeating a "Continued" header, and every chunk is then held to
//! the hard message limit. Chunks are delivered independently: a failed chunk
//! is logged and the remaining chunks are still attempted.

use std::sync::Arc;

use crate::error::SendError;
use crate::models::{GiftCard, NotifyConfig};
use crate::services::MessageSender;

/// Delivery result for one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Delivered,
    /// The channel is missing or the bot may not post there
    ChannelUnavailable(SendError),
    /// Transport or platform error
    Failed(SendError),
}

/// Per-chunk outcomes of one notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyReport {
    pub outcomes: Vec<ChunkOutcome>,
}

impl NotifyReport {
    pub fn delivered(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ChunkOutcome::Delivered))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }

    pub fn all_delivered(&self) -> bool {
        self.failed() == 0
    }
}

/// Formats new cards and posts them to a channel.
pub struct Notifier {
    sender: Arc<dyn MessageSender>,
    channel_id: String,
    max_message_len: usize,
    chunk_budget: usize,
}

impl Notifier {
    pub fn new(
        sender: Arc<dyn MessageSender>,
        channel_id: impl Into<String>,
        config: &NotifyConfig,
    ) -> Self {
        Self {
            sender,
            channel_id: channel_id.into(),
            max_message_len: config.max_message_len,
            chunk_budget: config.chunk_budget,
        }
    }

    /// Render the messages that announcing `cards` would send.
    pub fn messages(&self, source: &str, cards: &[GiftCard]) -> Vec<String> {
        format_chunks(source, cards, self.chunk_budget)
            .iter()
            .flat_map(|chunk| split_message(chunk, self.max_message_len))
            .filter(|part| !part.trim().is_empty())
            .collect()
    }

    /// Announce `cards` for `source`, one send per chunk.
    ///
    /// Nothing is sent when `cards` is empty.
    pub async fn notify(&self, source: &str, cards: &[GiftCard]) -> NotifyReport {
        let mut report = NotifyReport::default();

        for message in self.messages(source, cards) {
            let outcome = match self.sender.send(&self.channel_id, &message).await {
                Ok(()) => {
                    log::info!("Message sent to Discord channel {}", self.channel_id);
                    ChunkOutcome::Delivered
                }
                Err(e) if e.is_configuration() => {
                    log::error!("Could not deliver update for {}: {}", source, e);
                    ChunkOutcome::ChannelUnavailable(e)
                }
                Err(e) => {
                    log::error!("Error sending message to Discord for {}: {}", source, e);
                    ChunkOutcome::Failed(e)
                }
            };
            report.outcomes.push(outcome);
        }

        if !report.all_delivered() {
            log::warn!(
                "Failed to send {} of {} messages about new cards for {}",
                report.failed(),
                report.outcomes.len(),
                source
            );
        }
        report
    }
}

pub fn header(source: &str) -> String {
    format!("New gift cards available at {source}:")
}

pub fn continued_header(source: &str) -> String {
    format!("Continued: New gift cards available at {source}:")
}

/// Group card lines into chunks of at most `budget` characters.
///
/// Every chunk starts with a header and holds at least one card line, so a
/// single line longer than the budget still gets its own chunk.
pub fn format_chunks(source: &str, cards: &[GiftCard], budget: usize) -> Vec<String> {
    if cards.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = header(source);
    let mut current_len = current.chars().count();
    let mut has_lines = false;

    for card in cards {
        let line = card.notification_line();
        let line_len = line.chars().count();

        if has_lines && current_len + 1 + line_len > budget {
            chunks.push(std::mem::replace(&mut current, continued_header(source)));
            current_len = current.chars().count();
        }

        current.push('\n');
        current.push_str(&line);
        current_len += 1 + line_len;
        has_lines = true;
    }

    chunks.push(current);
    chunks
}

/// Split `text` into parts of at most `limit` characters.
///
/// Parts break at the last newline inside the limit and that newline is
/// dropped, so joining the parts with `'\n'` gives back `text`. A line with
/// no newline inside the limit is cut at the limit.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut parts = Vec::new();
    let mut rest = text;

    while let Some((cut, _)) = rest.char_indices().nth(limit) {
        let window = &rest[..cut];
        match window.rfind('\n') {
            Some(nl) => {
                parts.push(rest[..nl].to_string());
                rest = &rest[nl + 1..];
            }
            None => {
                parts.push(window.to_string());
                rest = &rest[cut..];
            }
        }
    }

    if !rest.is_empty() {
        parts.push(rest.to_string());
    }
    parts
}
