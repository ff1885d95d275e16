//! Episode link collection from the fully loaded listing page.

use crate::browser::BrowserPage;
use crate::config::CrawlerConfig;
use itertools::Itertools;
use std::error::Error;
use tracing::{debug, info, instrument};

/// Keep the hrefs that contain `channel_segment`, deduplicated and sorted.
///
/// The order is lexicographic, not chronological.
pub fn filter_episode_links<I, S>(hrefs: I, channel_segment: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    hrefs
        .into_iter()
        .map(Into::<String>::into)
        .filter(|href| href.contains(channel_segment))
        .unique()
        .sorted()
        .collect()
}

/// Read the episode anchors of the current page and return the in-channel links.
///
/// A selector that matches nothing yields an empty vector.
#[instrument(level = "info", skip_all, fields(selector = %config.link_selector))]
pub async fn collect_episode_links<P: BrowserPage>(
    page: &P,
    config: &CrawlerConfig,
) -> Result<Vec<String>, Box<dyn Error>> {
    let hrefs = page.anchor_hrefs(&config.link_selector).await?;
    let raw_count = hrefs.len();
    let links = filter_episode_links(hrefs, &config.channel_segment());

    info!(raw = raw_count, count = links.len(), "Found episodes");
    debug!(urls = ?links, "Episode URLs");
    Ok(links)
}
