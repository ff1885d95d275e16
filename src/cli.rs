//! Command-line interface definitions for Voicy Archive.
//!
//! Two subcommands are exposed:
//!
//! - `crawl`: archive every episode of a channel to Markdown
//! - `sniff`: inspect a saved page (or a live URL) for embedded JSON state
//!
//! Options given here override values from the YAML configuration file.

use clap::{Args, Parser, Subcommand};

/// Command-line arguments for the Voicy Archive application.
///
/// # Examples
///
/// ```sh
/// # Archive the default channel through a local chromedriver
/// voicy_archive crawl
///
/// # Another channel, another output directory
/// voicy_archive crawl --channel-id 1234 -o ./archive
///
/// # Look for embedded state in a saved page
/// voicy_archive sniff page.html
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scroll the channel listing and archive every episode page
    Crawl(CrawlArgs),
    /// Report JSON script blocks and `window.__X__` assignments in a page
    Sniff(SniffArgs),
}

#[derive(Args, Debug, Default)]
pub struct CrawlArgs {
    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Channel whose episodes are archived
    #[arg(long, env = "VOICY_CHANNEL_ID")]
    pub channel_id: Option<String>,

    /// Output directory for the Markdown files
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// WebDriver endpoint (e.g. chromedriver --port=4444)
    #[arg(long, env = "WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headed: bool,
}

#[derive(Args, Debug)]
pub struct SniffArgs {
    /// Path to a saved HTML file, or an http(s) URL to fetch
    #[arg(default_value = "page.html")]
    pub source: String,
}
