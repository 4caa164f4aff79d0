//! The row model shared by the extractors, the aggregator and the finalizer.

use std::fmt::Display;

/// Placeholder for fields that could not be read.
pub const NOT_AVAILABLE: &str = "N/A";
/// Placeholder for a listing without a readable title.
pub const TITLE_FALLBACK: &str = "Product";
/// Placeholder for a listing without a seller location tag.
pub const LOCATION_FALLBACK: &str = "Local";

/// Exported column names, in output order.
pub const FIELD_NAMES: [&str; 8] = [
    "Page",
    "Title",
    "Price",
    "Brand",
    "Review Count",
    "Rating",
    "Location",
    "Link",
];

/// Outcome of a single field extractor: a value, or the field's sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted<T> {
    Value(T),
    Sentinel,
}

impl<T> Extracted<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Extracted::Value(v) => Some(v),
            Extracted::Sentinel => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Extracted::Sentinel)
    }
}

impl<T: Display> Extracted<T> {
    /// Text form of the field, substituting `sentinel` when absent.
    pub fn render(&self, sentinel: &str) -> String {
        match self {
            Extracted::Value(v) => v.to_string(),
            Extracted::Sentinel => sentinel.to_string(),
        }
    }
}

impl<T> From<Option<T>> for Extracted<T> {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Extracted::Sentinel, Extracted::Value)
    }
}

/// One product listing as scraped from a results page.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub page: u32,
    pub title: Extracted<String>,
    pub price: Extracted<String>,
    pub brand: Extracted<String>,
    pub review_count: Extracted<String>,
    pub rating: Extracted<u32>,
    pub location: Extracted<String>,
    pub link: Extracted<String>,
}

impl ProductRecord {
    pub fn title_text(&self) -> String {
        self.title.render(TITLE_FALLBACK)
    }

    pub fn price_text(&self) -> String {
        self.price.render(NOT_AVAILABLE)
    }

    pub fn brand_text(&self) -> String {
        self.brand.render(NOT_AVAILABLE)
    }

    pub fn review_count_text(&self) -> String {
        self.review_count.render(NOT_AVAILABLE)
    }

    pub fn rating_text(&self) -> String {
        self.rating.render(NOT_AVAILABLE)
    }

    pub fn location_text(&self) -> String {
        self.location.render(LOCATION_FALLBACK)
    }

    pub fn link_text(&self) -> String {
        self.link.render(NOT_AVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(page: u32) -> ProductRecord {
        ProductRecord {
            page,
            title: Extracted::Sentinel,
            price: Extracted::Sentinel,
            brand: Extracted::Sentinel,
            review_count: Extracted::Sentinel,
            rating: Extracted::Sentinel,
            location: Extracted::Sentinel,
            link: Extracted::Sentinel,
        }
    }

    #[test]
    fn sentinels_render_per_field() {
        let record = blank(1);
        assert_eq!(record.title_text(), "Product");
        assert_eq!(record.price_text(), "N/A");
        assert_eq!(record.rating_text(), "N/A");
        assert_eq!(record.location_text(), "Local");
        assert_eq!(record.link_text(), "N/A");
    }

    #[test]
    fn option_converts_to_extracted() {
        assert!(Extracted::<String>::from(None).is_sentinel());
        let brand: Extracted<String> = Some("Apple".to_string()).into();
        assert_eq!(brand.value().map(String::as_str), Some("Apple"));
    }

    #[test]
    fn zero_rating_renders_as_number() {
        let mut record = blank(2);
        record.rating = Extracted::Value(0);
        assert_eq!(record.rating_text(), "0");
    }
}
