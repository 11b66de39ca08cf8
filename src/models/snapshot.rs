//! Last known listings per monitored source.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::GiftCard;

/// Mapping from source URL to the cards last extracted there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    sources: BTreeMap<String, Vec<GiftCard>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cards recorded for a source, if the source is present.
    pub fn get(&self, source: &str) -> Option<&[GiftCard]> {
        self.sources.get(source).map(Vec::as_slice)
    }

    /// Record the cards for a source, replacing any previous entry.
    pub fn insert(&mut self, source: impl Into<String>, cards: Vec<GiftCard>) {
        self.sources.insert(source.into(), cards);
    }

    pub fn contains(&self, source: &str) -> bool {
        self.sources.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Iterate over source URLs in sorted order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// Total number of cards across all sources.
    pub fn card_count(&self) -> usize {
        self.sources.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape_is_flat_object() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("siteA", vec![GiftCard::new("X", "£10", "10%", 2)]);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "siteA": [{"name": "X", "price": "£10", "savePercent": "10%", "quantity": 2}]
            })
        );
    }

    #[test]
    fn test_insert_replaces_entry() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("siteA", vec![GiftCard::new("X", "£10", "10%", 2)]);
        snapshot.insert("siteA", vec![GiftCard::new("Y", "£5", "5%", 1)]);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("siteA").unwrap()[0].name, "Y");
        assert_eq!(snapshot.card_count(), 1);
        assert!(snapshot.get("siteB").is_none());
    }
}
