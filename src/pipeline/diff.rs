//! Diff calculation for new-listing notifications.
//!
//! A card is new when its name was not listed for the same source in the
//! previous snapshot. Price or quantity changes on a known name are not
//! reported.

use std::collections::HashSet;

use crate::models::{GiftCard, Snapshot};

/// Cards in `current` whose names are absent from `previous[source]`.
///
/// Order follows `current`. When the source has no previous entry every
/// current card is new.
pub fn new_cards(source: &str, current: &[GiftCard], previous: &Snapshot) -> Vec<GiftCard> {
    let Some(prior) = previous.get(source) else {
        return current.to_vec();
    };

    let known: HashSet<&str> = prior.iter().map(|c| c.name.as_str()).collect();

    current
        .iter()
        .filter(|card| !known.contains(card.name.as_str()))
        .cloned()
        .collect()
}
