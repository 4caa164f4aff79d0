use anyhow::Result;
use clap::Parser;
use lazada_scraper::cli::{Args, ScrapeConfig};
use lazada_scraper::runner::{self, RunOutcome, RunSummary};
use lazada_scraper::style::{paint, Style};
use std::io::{self, IsTerminal};
use std::process::ExitCode;

/// Exit status used after Ctrl-C, as shells report for SIGINT.
const INTERRUPTED_EXIT: u8 = 130;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logger
    let log_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        ScrapeConfig::resolve(&args, &mut input, &mut output)?
    };

    log::info!("🚀 Lazada scraper v{}", env!("CARGO_PKG_VERSION"));
    log::info!(
        "📋 Searching \"{}\" across {} page(s)",
        config.target.query(),
        config.pages
    );

    let summary = runner::run(&config, runner::ctrl_c()).await?;

    if !args.quiet {
        print_summary(&summary, &config);
    }

    Ok(match summary.outcome {
        RunOutcome::Completed => ExitCode::SUCCESS,
        RunOutcome::Interrupted => ExitCode::from(INTERRUPTED_EXIT),
    })
}

/// Print the end-of-run report
fn print_summary(summary: &RunSummary, config: &ScrapeConfig) {
    let color = io::stdout().is_terminal();

    if summary.outcome == RunOutcome::Interrupted {
        println!("{}", paint("Scrape interrupted.", Style::Warning, color));
    }

    println!(
        "{}",
        paint(
            &format!(
                "Scraped {} product(s) from {} page(s)",
                summary.records, summary.pages_scraped
            ),
            Style::Success,
            color,
        )
    );

    if summary.pages_failed > 0 {
        println!(
            "{}",
            paint(
                &format!("{} page(s) failed and were skipped", summary.pages_failed),
                Style::Warning,
                color,
            )
        );
    }

    if summary.dataset.dropped > 0 {
        println!(
            "{}",
            paint(
                &format!("{} product(s) without a price left out", summary.dataset.dropped),
                Style::Info,
                color,
            )
        );
    }

    match summary.dataset.stats() {
        Some(stats) => println!(
            "{}",
            paint(
                &format!(
                    "Prices: {} listed, min ฿{:.2}, max ฿{:.2}, mean ฿{:.2}",
                    stats.count, stats.min, stats.max, stats.mean
                ),
                Style::Info,
                color,
            )
        ),
        None if !summary.dataset.sorted => println!(
            "{}",
            paint("Prices could not be parsed; rows left unsorted", Style::Error, color)
        ),
        None => {}
    }

    if !summary.saved {
        println!(
            "{}",
            paint(
                &format!("Nothing scraped; {} left untouched", config.output.display()),
                Style::Warning,
                color,
            )
        );
        return;
    }

    println!(
        "{}",
        paint(
            &format!("💾 {} row(s) written to {}", summary.dataset.rows.len(), config.output.display()),
            Style::Plain,
            color,
        )
    );
}
