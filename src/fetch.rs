//! Search URL construction, the page source abstraction and the HTTP backend.

use crate::error::{Result, ScraperError};
use crate::extract::has_products;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

pub const SEARCH_BASE: &str = "https://www.lazada.co.th/catalog/";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// A search term bound to the fixed catalog URL template.
#[derive(Debug, Clone)]
pub struct SearchTarget {
    query: String,
}

impl SearchTarget {
    pub fn new(query: impl Into<String>) -> Result<Self> {
        let query = query.into().trim().to_string();
        if query.is_empty() {
            return Err(ScraperError::InvalidInput("search query is empty".to_string()));
        }
        Ok(Self { query })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Results URL for a 1-based page: highest price first, official stores,
    /// local delivery, four stars and up.
    pub fn page_url(&self, page: u32) -> String {
        format!(
            "{}?q={}&sort=pricedesc&service=official&location=Local&rating=4&page={}",
            SEARCH_BASE,
            encode_query(&self.query),
            page
        )
    }
}

/// Percent-encodes a query value, spaces as `%20`.
fn encode_query(query: &str) -> String {
    // byte_serialize turns spaces into '+' and literal '+' into %2B
    url::form_urlencoded::byte_serialize(query.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Anything that can hand back the markup of a numbered results page.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch(&self, page: u32) -> Result<String>;
}

/// Returned by [`wait_until`] when the probe never succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitTimeout {
    pub waited: Duration,
}

/// Polls `probe` every `interval` until it returns true or `timeout` elapses.
///
/// The probe always runs at least once, so a zero timeout still checks. A
/// timeout too large to represent as a deadline never expires.
pub async fn wait_until<F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> std::result::Result<(), WaitTimeout>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now().checked_add(timeout);
    loop {
        if probe().await {
            return Ok(());
        }
        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(WaitTimeout { waited: timeout });
                }
                interval.min(deadline - now)
            }
            None => interval,
        };
        tokio::time::sleep(pause).await;
    }
}

/// Plain HTTP backend. Pages come back unrendered, so a page only counts as
/// loaded when the static markup already carries product cards.
pub struct HttpFetcher {
    client: reqwest::Client,
    target: SearchTarget,
}

impl HttpFetcher {
    pub fn new(
        target: SearchTarget,
        timeout: Duration,
        user_agent: Option<&str>,
        proxy: Option<&str>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("th-TH,th;q=0.9,en;q=0.8"));

        let mut client_builder = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT));

        if let Some(proxy_url) = proxy {
            Url::parse(proxy_url)
                .map_err(|e| ScraperError::InvalidUrl(format!("{}: {}", proxy_url, e)))?;
            log::debug!("Using proxy: {}", proxy_url);
            client_builder = client_builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self {
            client: client_builder.build()?,
            target,
        })
    }
}

impl PageSource for HttpFetcher {
    async fn fetch(&self, page: u32) -> Result<String> {
        let url = self.target.page_url(page);
        log::debug!("Fetching: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            log::warn!("Non-success status code {} for page {}", response.status(), page);
        }
        let html = response.text().await?;

        if !has_products(&html) {
            return Err(ScraperError::NotReady(page));
        }
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn page_url_encodes_query_and_fixes_filters() {
        let target = SearchTarget::new("SAMSUNG Galaxy S24").unwrap();
        assert_eq!(
            target.page_url(2),
            "https://www.lazada.co.th/catalog/?q=SAMSUNG%20Galaxy%20S24&sort=pricedesc&service=official&location=Local&rating=4&page=2"
        );
    }

    #[test]
    fn page_url_escapes_reserved_characters() {
        let target = SearchTarget::new("C++ & ไทย").unwrap();
        let url = target.page_url(1);
        assert!(url.contains("q=C%2B%2B%20%26%20%E0%B9%84"));
        assert!(Url::parse(&url).is_ok());
    }

    #[test]
    fn blank_query_is_rejected() {
        assert!(matches!(
            SearchTarget::new("   "),
            Err(ScraperError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn wait_until_succeeds_once_probe_turns_true() {
        let calls = Cell::new(0);
        let result = wait_until(Duration::from_secs(1), Duration::from_millis(5), || {
            calls.set(calls.get() + 1);
            let ready = calls.get() >= 3;
            async move { ready }
        })
        .await;
        assert_eq!(result, Ok(()));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn wait_until_times_out() {
        let timeout = Duration::from_millis(30);
        let result = wait_until(timeout, Duration::from_millis(5), || async { false }).await;
        assert_eq!(result, Err(WaitTimeout { waited: timeout }));
    }

    #[tokio::test]
    async fn unrepresentable_timeout_does_not_overflow() {
        let calls = Cell::new(0);
        let result = wait_until(Duration::from_secs(u64::MAX), Duration::from_millis(5), || {
            calls.set(calls.get() + 1);
            let ready = calls.get() >= 2;
            async move { ready }
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn zero_timeout_still_probes_once() {
        let result = wait_until(Duration::ZERO, Duration::from_millis(5), || async { true }).await;
        assert!(result.is_ok());
    }
}
