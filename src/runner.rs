//! One full run: open the page source, paginate, finalize, export.

use crate::aggregate::{collect_pages, Aggregator};
use crate::browser::{BrowserOptions, BrowserSession};
use crate::cli::{Backend, ScrapeConfig};
use crate::error::Result;
use crate::fetch::{HttpFetcher, PageSource};
use crate::finalize::{finalize, save, Dataset};
use std::future::Future;
use std::time::Duration;

/// How the pagination loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Interrupted,
}

#[derive(Debug)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub pages_scraped: usize,
    pub pages_failed: usize,
    pub records: usize,
    pub dataset: Dataset,
    /// False when the run was interrupted before anything was scraped and
    /// the output file was left alone.
    pub saved: bool,
}

/// Paginates through `source` until done or until `interrupt` resolves.
///
/// Records gathered before an interruption are kept.
pub async fn scrape<S, I>(source: &S, pages: u32, delay: Duration, interrupt: I) -> (Aggregator, RunOutcome)
where
    S: PageSource,
    I: Future<Output = ()>,
{
    let mut aggregator = Aggregator::new();
    let outcome = tokio::select! {
        biased;
        _ = interrupt => RunOutcome::Interrupted,
        _ = collect_pages(source, pages, delay, &mut aggregator) => RunOutcome::Completed,
    };
    (aggregator, outcome)
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Unable to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Runs the configured backend, then finalizes and writes the output file.
///
/// The browser session is closed on every path out of the pagination loop,
/// including interruption. An interrupted run with no records does not touch
/// the output file.
pub async fn run<I>(config: &ScrapeConfig, interrupt: I) -> Result<RunSummary>
where
    I: Future<Output = ()>,
{
    tokio::pin!(interrupt);

    let (aggregator, outcome) = match config.backend {
        Backend::Browser => {
            let options = BrowserOptions {
                headless: config.headless,
                user_agent: config.user_agent.clone(),
                chrome_executable: config.chrome.clone(),
            };
            let session = tokio::select! {
                biased;
                _ = &mut interrupt => return export(Aggregator::new(), RunOutcome::Interrupted, config),
                session = BrowserSession::launch(&options) => session?,
            };

            let fetcher = session.fetcher(config.target.clone(), config.timeout);
            let result = scrape(&fetcher, config.pages, config.delay, &mut interrupt).await;
            session.close().await;
            result
        }
        Backend::Http => {
            let fetcher = HttpFetcher::new(
                config.target.clone(),
                config.timeout,
                config.user_agent.as_deref(),
                config.proxy.as_deref(),
            )?;
            scrape(&fetcher, config.pages, config.delay, &mut interrupt).await
        }
    };

    export(aggregator, outcome, config)
}

fn export(aggregator: Aggregator, outcome: RunOutcome, config: &ScrapeConfig) -> Result<RunSummary> {
    let dataset = finalize(aggregator.records());

    let saved = if outcome == RunOutcome::Interrupted && aggregator.total() == 0 {
        log::warn!(
            "Interrupted before any record was collected; leaving {} untouched",
            config.output.display()
        );
        false
    } else {
        if outcome == RunOutcome::Interrupted {
            log::warn!("Interrupted; exporting {} record(s) collected so far", aggregator.total());
        }
        save(&dataset, &config.output, config.format)?;
        log::info!("Output saved to: {}", config.output.display());
        true
    };

    Ok(RunSummary {
        outcome,
        pages_scraped: aggregator.reports().len(),
        pages_failed: aggregator.failures().len(),
        records: aggregator.total(),
        dataset,
        saved,
    })
}
