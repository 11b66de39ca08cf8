//! Utility functions and helpers.

pub mod http;

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// Path of an error capture taken at `at`, e.g. `error_screenshot_20260102_030405.html`.
pub fn diagnostic_path(dir: &Path, at: NaiveDateTime) -> PathBuf {
    dir.join(format!("error_screenshot_{}.html", at.format("%Y%m%d_%H%M%S")))
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
