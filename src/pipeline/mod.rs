//! Pipeline entry points for gift card checks.
//!
//! - `Checker::run_once`: Check every source, announce new cards, persist the snapshot
//! - `Scheduler::run`: Repeat checks on a fixed interval until shutdown

pub mod check;
pub mod diff;
pub mod notify;
pub mod schedule;

#[cfg(test)]
mod testing;

pub use check::{Checker, RunReport, SourceOutcome, SourceReport};
pub use diff::new_cards;
pub use notify::{ChunkOutcome, Notifier, NotifyReport, format_chunks, split_message};
pub use schedule::Scheduler;
