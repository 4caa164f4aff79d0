//! Rendered-page backend driving a Chrome instance over CDP.

use crate::error::{Result, ScraperError};
use crate::extract::selectors::PRODUCT_CONTAINER;
use crate::fetch::{wait_until, PageSource, SearchTarget, DEFAULT_USER_AGENT};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launch settings for [`BrowserSession`].
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub user_agent: Option<String>,
    pub chrome_executable: Option<PathBuf>,
}

/// One Chrome process plus the tab every page is loaded into.
///
/// Call [`BrowserSession::close`] when done. If the session is dropped
/// without it, the CDP handler is aborted and chromiumoxide kills the child
/// process on drop.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);

        let mut builder = BrowserConfig::builder().window_size(1366, 768).args([
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            format!("--user-agent={}", user_agent),
        ]);
        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &options.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(ScraperError::Browser)?;

        log::debug!("Launching browser (headless: {})", options.headless);
        let (mut browser, mut handler) = Browser::launch(config).await?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    // Newer Chrome builds send messages chromiumoxide cannot decode
                    log::trace!("CDP handler error (continuing): {}", e);
                }
            }
            log::debug!("CDP handler task completed");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler.abort();
                return Err(e.into());
            }
        };

        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    /// Shuts the browser down and waits for the process to exit.
    pub async fn close(mut self) {
        log::debug!("Closing browser session");
        if let Err(e) = self.browser.close().await {
            log::debug!("Browser close error (ignored): {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            log::debug!("Browser wait error (ignored): {}", e);
        }
        self.handler.abort();
    }

    pub fn fetcher(&self, target: SearchTarget, timeout: Duration) -> BrowserFetcher<'_> {
        BrowserFetcher {
            page: &self.page,
            target,
            timeout,
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Loads results pages in the session's tab.
pub struct BrowserFetcher<'a> {
    page: &'a Page,
    target: SearchTarget,
    timeout: Duration,
}

impl PageSource for BrowserFetcher<'_> {
    async fn fetch(&self, page: u32) -> Result<String> {
        let url = self.target.page_url(page);
        log::debug!("Navigating to: {}", url);

        match tokio::time::timeout(self.timeout, self.page.goto(url.as_str())).await {
            Ok(result) => {
                result?;
            }
            Err(_) => {
                return Err(ScraperError::Timeout {
                    page,
                    waited: self.timeout,
                })
            }
        }

        let tab = self.page;
        wait_until(self.timeout, POLL_INTERVAL, || async move {
            tab.find_element(PRODUCT_CONTAINER).await.is_ok()
        })
        .await
        .map_err(|timeout| ScraperError::Timeout {
            page,
            waited: timeout.waited,
        })?;

        Ok(self.page.content().await?)
    }
}
