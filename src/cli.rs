//! Command line arguments, interactive prompts and the resolved run config.

use crate::error::{Result, ScraperError};
use crate::fetch::SearchTarget;
use crate::finalize::OutputFormat;
use clap::{Parser, ValueEnum};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

pub const MAX_PAGES: u32 = 50;
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// How result pages are retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Render pages in Chrome (default)
    Browser,
    /// Plain HTTP requests, no JavaScript
    Http,
}

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "lazada-scraper")]
#[command(about = "Scrape Lazada Thailand search results into a price-sorted table", long_about = None)]
pub struct Args {
    /// Search term
    #[arg(short, long, required_unless_present = "interactive")]
    pub query: Option<String>,

    /// Number of result pages to scrape (1-50)
    #[arg(short, long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..=50))]
    pub pages: u32,

    /// Run Chrome without a window
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub headless: bool,

    /// Output file, overwritten if it exists
    #[arg(short, long, default_value = "lazada_data.csv")]
    pub output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Page retrieval backend
    #[arg(short, long, value_enum, default_value_t = Backend::Browser)]
    pub backend: Backend,

    /// Seconds to wait for a page to show listings (1-300)
    #[arg(short, long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..=300))]
    pub timeout: u64,

    /// Delay between pages in milliseconds
    #[arg(short, long, default_value = "1000")]
    pub delay: u64,

    /// Custom user agent
    #[arg(short, long)]
    pub user_agent: Option<String>,

    /// Proxy URL for the http backend (e.g., http://proxy.example.com:8080)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Path to the Chrome/Chromium executable
    #[arg(long)]
    pub chrome: Option<PathBuf>,

    /// Ask for query, page count and headless mode
    #[arg(short, long)]
    pub interactive: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(long)]
    pub quiet: bool,
}

/// Everything a run needs, after flags and prompts are merged.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub target: SearchTarget,
    pub pages: u32,
    pub headless: bool,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub backend: Backend,
    pub timeout: Duration,
    pub delay: Duration,
    pub user_agent: Option<String>,
    pub proxy: Option<String>,
    pub chrome: Option<PathBuf>,
}

impl ScrapeConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let query = args
            .query
            .as_deref()
            .ok_or_else(|| ScraperError::InvalidInput("a search query is required".to_string()))?;
        Self::build(args, SearchTarget::new(query)?, args.pages, args.headless)
    }

    /// Like [`ScrapeConfig::from_args`], but asks on `output` and reads
    /// answers from `input` when `--interactive` was given. Flag values act
    /// as the defaults offered in each prompt.
    pub fn resolve<R: BufRead, W: Write>(args: &Args, input: &mut R, output: &mut W) -> Result<Self> {
        if !args.interactive {
            return Self::from_args(args);
        }
        let query = prompt_query(input, output, args.query.as_deref())?;
        let pages = prompt_pages(input, output, args.pages)?;
        let headless = prompt_yes_no(input, output, "Run browser headless?", args.headless)?;
        Self::build(args, SearchTarget::new(query)?, pages, headless)
    }

    fn build(args: &Args, target: SearchTarget, pages: u32, headless: bool) -> Result<Self> {
        if !(1..=MAX_PAGES).contains(&pages) {
            return Err(ScraperError::InvalidInput(format!(
                "page count must be between 1 and {}, got {}",
                MAX_PAGES, pages
            )));
        }
        Ok(Self {
            target,
            pages,
            headless,
            output: args.output.clone(),
            format: args.format,
            backend: args.backend,
            timeout: Duration::from_secs(args.timeout),
            delay: Duration::from_millis(args.delay),
            user_agent: args.user_agent.clone(),
            proxy: args.proxy.clone(),
            chrome: args.chrome.clone(),
        })
    }
}

fn read_answer<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    what: &'static str,
) -> Result<String> {
    write!(output, "{}", prompt)?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(ScraperError::Prompt(what));
    }
    Ok(line.trim().to_string())
}

/// Asks for the search term until a non-blank one is given.
pub fn prompt_query<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    default: Option<&str>,
) -> Result<String> {
    let prompt = match default {
        Some(d) => format!("Search for [{}]: ", d),
        None => "Search for: ".to_string(),
    };
    loop {
        let answer = read_answer(input, output, &prompt, "the search query")?;
        if !answer.is_empty() {
            return Ok(answer);
        }
        if let Some(d) = default.filter(|d| !d.trim().is_empty()) {
            return Ok(d.to_string());
        }
        writeln!(output, "The search query cannot be empty.")?;
    }
}

/// Asks for a page count in `1..=50`; blank keeps `default`.
pub fn prompt_pages<R: BufRead, W: Write>(input: &mut R, output: &mut W, default: u32) -> Result<u32> {
    let prompt = format!("Pages to scrape (1-{}) [{}]: ", MAX_PAGES, default);
    loop {
        let answer = read_answer(input, output, &prompt, "the page count")?;
        if answer.is_empty() {
            return Ok(default);
        }
        match answer.parse::<u32>() {
            Ok(pages) if (1..=MAX_PAGES).contains(&pages) => return Ok(pages),
            _ => writeln!(output, "Enter a whole number between 1 and {}.", MAX_PAGES)?,
        }
    }
}

pub fn prompt_yes_no<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    default: bool,
) -> Result<bool> {
    let prompt = format!("{} [{}]: ", question, if default { "Y/n" } else { "y/N" });
    loop {
        let answer = read_answer(input, output, &prompt, "a yes/no question")?;
        match answer.to_lowercase().as_str() {
            "" => return Ok(default),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(output, "Please answer y or n.")?,
        }
    }
}
