//! Lazada search results scraper.
//!
//! Pages are fetched one at a time, every product card is turned into a
//! [`record::ProductRecord`] by the total extractors in [`extract`], and the
//! collected records are finalized into a price-sorted table.

pub mod aggregate;
pub mod browser;
pub mod cli;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod finalize;
pub mod normalize;
pub mod record;
pub mod runner;
pub mod style;

pub use error::{Result, ScraperError};
