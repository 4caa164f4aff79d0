//! Per-field extractors for Lazada search result cards.
//!
//! Every extractor is total: it returns either the field value or
//! [`Extracted::Sentinel`], never an error. The class names below are the
//! site's generated markup and change without notice; update them here when
//! a run comes back full of sentinels.

use crate::normalize::{normalize_brand, normalize_text};
use crate::record::{Extracted, ProductRecord};
use scraper::{ElementRef, Html, Selector};

/// CSS selectors for the search results page.
pub mod selectors {
    use scraper::Selector;
    use std::sync::LazyLock;

    /// One product card.
    pub const PRODUCT_CONTAINER: &str = "div.Bm3ON";

    pub static PRODUCT: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(PRODUCT_CONTAINER).unwrap());
    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1.JrAyI").unwrap());
    pub static PRICE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.ooOxS").unwrap());
    pub static BRAND_BOX: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div.RfADt").unwrap());
    pub static REVIEW_COUNT: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span.qzqFw").unwrap());
    /// Filled star icon; empty stars lack the second class.
    pub static FILLED_STAR: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("i._9-ogB.Dy1nx").unwrap());
    pub static LOCATION: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span.oa6ri").unwrap());
    pub static LINK_BOX: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div._95X4G").unwrap());
    pub static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
    pub static ANCHOR_WITH_HREF: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("a[href]").unwrap());
}

/// Trimmed text of the first element matching `selector`, if non-blank.
fn text_of(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn strip_parens(text: &str) -> String {
    text.trim()
        .trim_matches(|c| c == '(' || c == ')')
        .trim()
        .to_string()
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

pub fn title(product: ElementRef<'_>) -> Extracted<String> {
    text_of(product, &selectors::TITLE)
        .map(|text| normalize_text(&text))
        .and_then(non_empty)
        .into()
}

/// Price text as displayed, currency glyph and grouping included.
pub fn price(product: ElementRef<'_>) -> Extracted<String> {
    text_of(product, &selectors::PRICE).into()
}

/// First link inside the brand box, with Thai characters removed.
pub fn brand(product: ElementRef<'_>) -> Extracted<String> {
    product
        .select(&selectors::BRAND_BOX)
        .next()
        .and_then(|container| text_of(container, &selectors::ANCHOR))
        .map(|text| normalize_brand(&text))
        .and_then(non_empty)
        .into()
}

/// Review count without its surrounding parentheses: `(128)` becomes `128`.
pub fn review_count(product: ElementRef<'_>) -> Extracted<String> {
    text_of(product, &selectors::REVIEW_COUNT)
        .map(|text| strip_parens(&text))
        .and_then(non_empty)
        .into()
}

/// Number of filled stars on the card. Zero stars is a valid rating.
pub fn rating(product: ElementRef<'_>) -> Extracted<u32> {
    let stars = product.select(&selectors::FILLED_STAR).count();
    u32::try_from(stars).ok().into()
}

pub fn location(product: ElementRef<'_>) -> Extracted<String> {
    text_of(product, &selectors::LOCATION)
        .map(|text| strip_parens(&text))
        .and_then(non_empty)
        .into()
}

/// Product page URL; protocol-relative links are upgraded to https.
pub fn link(product: ElementRef<'_>) -> Extracted<String> {
    product
        .select(&selectors::LINK_BOX)
        .next()
        .and_then(|container| container.select(&selectors::ANCHOR_WITH_HREF).next())
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(absolutize)
        .into()
}

fn absolutize(href: &str) -> String {
    if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    }
}

/// Runs every extractor over one product card.
pub fn product(page: u32, card: ElementRef<'_>) -> ProductRecord {
    ProductRecord {
        page,
        title: title(card),
        price: price(card),
        brand: brand(card),
        review_count: review_count(card),
        rating: rating(card),
        location: location(card),
        link: link(card),
    }
}

/// One record per product card found in a results page.
pub fn page_products(page: u32, html: &str) -> Vec<ProductRecord> {
    let document = Html::parse_document(html);
    document
        .select(&selectors::PRODUCT)
        .map(|card| product(page, card))
        .collect()
}

/// Whether the markup contains at least one product card.
pub fn has_products(html: &str) -> bool {
    Html::parse_document(html)
        .select(&selectors::PRODUCT)
        .next()
        .is_some()
}
