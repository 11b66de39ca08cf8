//! Gift card listing data structure.

use serde::{Deserialize, Serialize};

/// Placeholder used when a listing has no price or discount text.
pub const NOT_AVAILABLE: &str = "N/A";

/// A gift card listing scraped from a shop page.
///
/// Identity across runs is by `name` alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GiftCard {
    /// Card title as shown on the listing
    pub name: String,

    /// Display price (e.g. "£9.50")
    pub price: String,

    /// Display discount (e.g. "5%")
    pub save_percent: String,

    /// Units in stock, always at least 1
    pub quantity: u32,
}

impl GiftCard {
    pub fn new(
        name: impl Into<String>,
        price: impl Into<String>,
        save_percent: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            save_percent: save_percent.into(),
            quantity,
        }
    }

    /// Render the card as a single notification line.
    pub fn notification_line(&self) -> String {
        format!(
            "- {} (Price: {}, Save: {}, Quantity: {})",
            self.name, self.price, self.save_percent, self.quantity
        )
    }
}
