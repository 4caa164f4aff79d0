use std::time::Duration;
use thiserror::Error;

/// Errors raised by the fetch, prompt and export stages.
///
/// Field-level extraction never produces one of these; extractors fall back
/// to sentinels instead.
#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Browser error: {0}")]
    Browser(String),
    #[error("Timeout: page {page} not ready after {} seconds", .waited.as_secs())]
    Timeout { page: u32, waited: Duration },
    #[error("Page {0} has no product listings")]
    NotReady(u32),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Input closed before {0} was answered")]
    Prompt(&'static str),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<chromiumoxide::error::CdpError> for ScraperError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        ScraperError::Browser(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;

/// A page that contributed no records because it could not be fetched.
#[derive(Debug)]
pub struct PageFailure {
    pub page: u32,
    pub error: ScraperError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_page_and_seconds() {
        let err = ScraperError::Timeout {
            page: 3,
            waited: Duration::from_secs(10),
        };
        assert_eq!(err.to_string(), "Timeout: page 3 not ready after 10 seconds");
    }
}
