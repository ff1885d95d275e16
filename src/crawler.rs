//! The archive pipeline: scroll the listing, collect links, process and
//! write every episode in turn.
//!
//! Everything runs on one page, strictly one step after another. A fatal
//! error stops the run; Markdown files written before it stay on disk.

use crate::browser::BrowserPage;
use crate::config::CrawlerConfig;
use crate::extract::EpisodeExtractor;
use crate::links::collect_episode_links;
use crate::models::CrawlSummary;
use crate::outputs::markdown::write_episode;
use crate::processor::process_episode;
use crate::scroll::scroll_to_end;
use std::error::Error;
use tracing::{info, instrument};

/// Archive every episode of the configured channel.
///
/// `config.output_dir` must already exist.
///
/// # Errors
///
/// Returns the first navigation, browser or write failure.
#[instrument(level = "info", skip_all, fields(channel_id = %config.channel_id))]
pub async fn run_crawl<P, E>(
    page: &P,
    config: &CrawlerConfig,
    extractor: &E,
) -> Result<CrawlSummary, Box<dyn Error>>
where
    P: BrowserPage,
    E: EpisodeExtractor,
{
    let listing_url = config.listing_url()?;
    info!(url = %listing_url, "Navigating to listing");
    page.goto(listing_url.as_str()).await?;

    let scroll = scroll_to_end(page, &config.scroll).await?;
    let links = collect_episode_links(page, config).await?;

    let mut summary = CrawlSummary {
        scroll,
        discovered: links.len(),
        archived: Vec::with_capacity(links.len()),
    };

    for (i, url) in links.iter().enumerate() {
        let processed = process_episode(page, url, config, extractor).await?;
        let path = write_episode(&processed.record, &config.output_dir).await?;
        summary.archived.push(path);
        info!(
            index = i + 1,
            total = links.len(),
            expand_attempted = processed.expand.attempted,
            expand_succeeded = processed.expand.succeeded,
            expand_clicked = processed.expand.clicked,
            expand_error = processed.expand.error.as_deref(),
            "Episode archived"
        );
        page.wait(config.politeness_delay()).await;
    }

    info!(
        discovered = summary.discovered,
        archived = summary.archived.len(),
        "Crawl finished"
    );
    Ok(summary)
}
