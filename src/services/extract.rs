// src/services/extract.rs

//! Gift card extraction.
//!
//! Turns a rendered shop page into an ordered list of in-stock [`GiftCard`]s.
//! Extraction is a pure function over the DOM so it can be tested against
//! fixture HTML without a live page.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{GiftCard, NOT_AVAILABLE};

/// Container holding the shop's listing table.
pub const SHOP_CONTAINER: &str = r#"div[data-controller="buy-shop"]"#;

const ROW: &str = r#"div[data-controller="buy-shop"] table tr"#;
const TITLE: &str = "span.hidden-xs";
const PRICE_CELL: &str = "td.text-right.warning";
const SPAN: &str = "span";
const AVAILABILITY: &str = "small.availability span";

/// Index of the span holding the discount inside the price cell.
const DISCOUNT_SPAN: usize = 2;

static LEADING_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+").expect("valid leading integer pattern"));

/// Compiled selectors for the shop listing markup.
#[derive(Debug, Clone)]
pub struct ShopSelectors {
    container: Selector,
    row: Selector,
    title: Selector,
    price_cell: Selector,
    span: Selector,
    availability: Selector,
}

impl ShopSelectors {
    pub fn new() -> Result<Self> {
        Ok(Self {
            container: parse_selector(SHOP_CONTAINER)?,
            row: parse_selector(ROW)?,
            title: parse_selector(TITLE)?,
            price_cell: parse_selector(PRICE_CELL)?,
            span: parse_selector(SPAN)?,
            availability: parse_selector(AVAILABILITY)?,
        })
    }
}

/// Extracts gift cards from shop pages.
#[derive(Debug, Clone)]
pub struct Extractor {
    selectors: ShopSelectors,
}

impl Extractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            selectors: ShopSelectors::new()?,
        })
    }

    /// Parse raw page HTML and extract its cards.
    pub fn extract_html(&self, url: &str, html: &str) -> Result<Vec<GiftCard>> {
        let document = Html::parse_document(html);
        self.extract(url, &document)
    }

    /// Extract in-stock cards from a parsed page, in document order.
    ///
    /// Malformed rows are logged and skipped. A page without the shop
    /// container is an error for the whole page.
    pub fn extract(&self, url: &str, document: &Html) -> Result<Vec<GiftCard>> {
        if document.select(&self.selectors.container).next().is_none() {
            return Err(AppError::extraction(
                url,
                format!("shop container {SHOP_CONTAINER} not found"),
            ));
        }

        let mut cards = Vec::new();
        for row in document.select(&self.selectors.row) {
            if is_hidden(&row) {
                continue;
            }
            match self.parse_row(&row) {
                Ok(Some(card)) => cards.push(card),
                Ok(None) => {}
                Err(e) => log::warn!("Skipping malformed row on {}: {}", url, e),
            }
        }

        log::debug!("Extracted {} gift cards from {}", cards.len(), url);
        Ok(cards)
    }

    /// Parse one listing row. `Ok(None)` means the row is not an in-stock card.
    fn parse_row(&self, row: &ElementRef) -> std::result::Result<Option<GiftCard>, String> {
        let Some(title) = row.select(&self.selectors.title).next() else {
            log::debug!("No title span found for row: {}", row.html());
            return Ok(None);
        };
        let name = element_text(&title);
        if name.is_empty() {
            log::debug!("Empty title span for row: {}", row.html());
            return Ok(None);
        }

        let (price, save_percent) = match row.select(&self.selectors.price_cell).next() {
            Some(cell) => {
                let spans: Vec<ElementRef> = cell.select(&self.selectors.span).collect();
                let price = spans
                    .first()
                    .map(element_text)
                    .ok_or_else(|| format!("price cell for '{name}' has no span"))?;
                let save = spans
                    .get(DISCOUNT_SPAN)
                    .map(element_text)
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string());
                (price, save)
            }
            None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
        };

        let quantity = match row.select(&self.selectors.availability).next() {
            Some(el) => parse_quantity(&element_text(&el)),
            None => 0,
        };
        if quantity <= 0 {
            return Ok(None);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        Ok(Some(GiftCard {
            name,
            price,
            save_percent,
            quantity,
        }))
    }
}

/// Leading integer of `text`, or 0 when there is none.
///
/// Digit runs too long for an `i64` saturate at the bound of their sign.
pub fn parse_quantity(text: &str) -> i64 {
    let Some(m) = LEADING_INT.find(text.trim()) else {
        return 0;
    };
    let digits = m.as_str();
    digits.parse().unwrap_or(if digits.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    })
}

fn is_hidden(row: &ElementRef) -> bool {
    row.value().attr("style").is_some_and(|style| {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        compact.contains("display:none")
    })
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
