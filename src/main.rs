//! # Voicy Archive
//!
//! Archives every episode page of a Voicy channel to Markdown by driving a
//! headless browser through WebDriver.
//!
//! ## Usage
//!
//! ```sh
//! chromedriver --port=4444 &
//! voicy_archive crawl -o drafts/voicy_history
//! ```
//!
//! ## Architecture
//!
//! The crawl is a single sequential pipeline:
//! 1. **Scrolling**: scroll the channel listing until its height settles
//! 2. **Collecting**: gather, deduplicate and sort the episode links
//! 3. **Processing**: visit each episode, expand the transcript, extract fields
//! 4. **Output**: write one Markdown file per episode

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod browser;
mod cli;
mod config;
mod crawler;
mod extract;
mod links;
mod models;
mod outputs;
mod processor;
mod scroll;
mod sniff;
mod utils;

use browser::WebDriverPage;
use cli::{Cli, Command, CrawlArgs};
use config::CrawlerConfig;
use extract::HtmlEpisodeExtractor;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    match args.command {
        Command::Crawl(crawl) => crawl_channel(&crawl).await,
        Command::Sniff(sniff) => {
            sniff::sniff(&sniff.source).await?;
            Ok(())
        }
    }
}

async fn crawl_channel(args: &CrawlArgs) -> Result<(), Box<dyn Error>> {
    let start_time = std::time::Instant::now();
    let config = CrawlerConfig::load(args.config.as_deref())
        .await?
        .with_overrides(args);
    info!(
        channel_id = %config.channel_id,
        output_dir = %config.output_dir,
        run_date = %Local::now().date_naive(),
        "voicy_archive starting up"
    );

    if let Err(e) = ensure_writable_dir(&config.output_dir).await {
        error!(
            path = %config.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let page = WebDriverPage::connect(&config.browser).await?;
    let result = crawler::run_crawl(&page, &config, &HtmlEpisodeExtractor).await;
    let closed = page.close().await;
    let summary = result?;
    closed?;

    let elapsed = start_time.elapsed();
    info!(
        discovered = summary.discovered,
        archived = summary.archived.len(),
        scrolls = summary.scroll.scrolls,
        ?elapsed,
        secs = elapsed.as_secs(),
        "Execution complete"
    );
    Ok(())
}
