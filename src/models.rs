//! Data models passed between the pipeline stages.
//!
//! - [`EpisodeRecord`]: fields extracted from one episode page
//! - [`ExpandOutcome`]: result of the best-effort "show more" interaction
//! - [`ScrollReport`]: what the infinite-scroll loop observed
//! - [`CrawlSummary`]: totals for one run

use chrono::NaiveDate;
use std::path::PathBuf;

/// Title used when an episode page has no usable `h1`.
pub const NO_TITLE: &str = "No Title";

/// Fields extracted from one episode page.
///
/// Records are transient: each one is rendered to Markdown right after
/// extraction and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRecord {
    /// The episode page the record was extracted from.
    pub url: String,
    /// Text of the first `h1`, or [`NO_TITLE`].
    pub title: String,
    /// Stripped text of the first `time` element, if there was one.
    pub date_raw: Option<String>,
    /// Parsed publication date, or the crawl date when parsing failed.
    pub file_date: NaiveDate,
    /// Newline-joined text of the `article` container (or `body`).
    pub body_text: String,
}

/// Typed outcome of clicking the "show more" buttons.
///
/// The interaction never aborts episode processing; the outcome is only
/// logged and returned for inspection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandOutcome {
    /// At least one click was tried.
    pub attempted: bool,
    /// Every tried click went through.
    pub succeeded: bool,
    /// Number of buttons that were clicked, including those clicked before a
    /// failure.
    pub clicked: usize,
    /// Failure message when the interaction raised an error.
    pub error: Option<String>,
}

impl ExpandOutcome {
    /// No visible button was found, so nothing was clicked.
    pub fn nothing_to_expand() -> Self {
        Self::default()
    }

    pub fn clicked(count: usize) -> Self {
        Self {
            attempted: count > 0,
            succeeded: count > 0,
            clicked: count,
            error: None,
        }
    }

    /// The interaction broke off after `clicked` buttons went through.
    pub fn failed(clicked: usize, error: impl Into<String>) -> Self {
        Self {
            attempted: true,
            succeeded: false,
            clicked,
            error: Some(error.into()),
        }
    }
}

/// Observations of the scroll loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollReport {
    /// Number of scroll actions performed.
    pub scrolls: usize,
    /// Number of height samples taken, including the initial one.
    pub samples: usize,
    /// Height at which the page settled.
    pub final_height: u64,
}

/// Totals for one crawl run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub scroll: ScrollReport,
    /// Distinct in-channel episode links found on the listing page.
    pub discovered: usize,
    /// Markdown files written, in processing order.
    pub archived: Vec<PathBuf>,
}
