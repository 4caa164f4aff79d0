//! Turns fetched pages into the run's record sequence.

use crate::error::{PageFailure, ScraperError};
use crate::extract::page_products;
use crate::fetch::PageSource;
use crate::record::ProductRecord;
use std::time::Duration;

/// Per-page counts reported after each successful page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageReport {
    pub page: u32,
    pub found: usize,
    pub running_total: usize,
}

/// Records collected so far, in scrape order, plus the pages that failed.
#[derive(Debug, Default)]
pub struct Aggregator {
    records: Vec<ProductRecord>,
    reports: Vec<PageReport>,
    failures: Vec<PageFailure>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts every product card of `html` and appends the records.
    pub fn ingest(&mut self, page: u32, html: &str) -> PageReport {
        let products = page_products(page, html);
        let found = products.len();
        self.records.extend(products);

        let report = PageReport {
            page,
            found,
            running_total: self.records.len(),
        };
        self.reports.push(report);
        report
    }

    pub fn record_failure(&mut self, page: u32, error: ScraperError) {
        self.failures.push(PageFailure { page, error });
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn reports(&self) -> &[PageReport] {
        &self.reports
    }

    pub fn failures(&self) -> &[PageFailure] {
        &self.failures
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn into_records(self) -> Vec<ProductRecord> {
        self.records
    }
}

/// Fetches pages `1..=pages` one after another.
///
/// A page that fails is logged and skipped; the loop always moves on to the
/// next index. `aggregator` is borrowed so that whatever was collected stays
/// available if this future is dropped part way through.
pub async fn collect_pages<S: PageSource>(
    source: &S,
    pages: u32,
    delay: Duration,
    aggregator: &mut Aggregator,
) {
    for page in 1..=pages {
        log::info!("Loading page {}/{} ...", page, pages);

        match source.fetch(page).await {
            Ok(html) => {
                let report = aggregator.ingest(page, &html);
                log::info!(
                    "Page {}: found {} products (total {})",
                    report.page,
                    report.found,
                    report.running_total
                );
            }
            Err(e) => {
                log::warn!("Skipping page {}: {}", page, e);
                aggregator.record_failure(page, e);
            }
        }

        if page < pages && !delay.is_zero() {
            log::debug!("Waiting {}ms before next page", delay.as_millis());
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use std::collections::HashMap;

    fn card(price: &str) -> String {
        format!(r#"<div class="Bm3ON"><span class="ooOxS">{price}</span></div>"#)
    }

    struct FixtureSource {
        pages: HashMap<u32, String>,
    }

    impl PageSource for FixtureSource {
        async fn fetch(&self, page: u32) -> Result<String> {
            self.pages
                .get(&page)
                .cloned()
                .ok_or(ScraperError::Timeout {
                    page,
                    waited: Duration::from_secs(10),
                })
        }
    }

    #[test]
    fn ingest_tracks_running_total() {
        let mut aggregator = Aggregator::new();
        let first = aggregator.ingest(1, &(card("฿1") + &card("฿2")));
        let second = aggregator.ingest(2, &card("฿3"));
        assert_eq!(first, PageReport { page: 1, found: 2, running_total: 2 });
        assert_eq!(second, PageReport { page: 2, found: 1, running_total: 3 });
        assert_eq!(aggregator.reports().len(), 2);
    }

    #[test]
    fn duplicate_listings_are_kept() {
        let mut aggregator = Aggregator::new();
        aggregator.ingest(1, &card("฿5"));
        aggregator.ingest(2, &card("฿5"));
        assert_eq!(aggregator.total(), 2);
    }

    #[test]
    fn page_without_cards_adds_nothing() {
        let mut aggregator = Aggregator::new();
        let report = aggregator.ingest(1, "<html><body><p>No results</p></body></html>");
        assert_eq!(report.found, 0);
        assert_eq!(aggregator.total(), 0);
    }

    #[tokio::test]
    async fn failed_middle_page_is_skipped() {
        let source = FixtureSource {
            pages: HashMap::from([(1, card("฿100")), (3, card("฿300") + &card("฿30"))]),
        };
        let mut aggregator = Aggregator::new();
        collect_pages(&source, 3, Duration::ZERO, &mut aggregator).await;

        let pages: Vec<u32> = aggregator.records().iter().map(|r| r.page).collect();
        assert_eq!(pages, vec![1, 3, 3]);
        assert_eq!(aggregator.failures().len(), 1);
        assert_eq!(aggregator.failures()[0].page, 2);
    }
}
