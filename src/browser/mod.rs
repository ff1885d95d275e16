//! Browser access behind a narrow async interface.
//!
//! The crawler never talks to a WebDriver client directly. Every remote
//! interaction it needs is a method of [`BrowserPage`], so the pipeline can be
//! driven by the real [`WebDriverPage`] or by an in-memory page in tests.
//!
//! Every method is a suspension point; the crawler awaits them strictly in
//! sequence on a single page.

use std::error::Error;
use std::fmt;
use std::time::Duration;

pub mod webdriver;

#[cfg(test)]
pub mod fake;

pub use webdriver::WebDriverPage;

/// One browser tab, as seen by the crawler.
pub trait BrowserPage {
    /// Navigate to `url` and wait for the document to load.
    async fn goto(&self, url: &str) -> Result<(), Box<dyn Error>>;

    /// Wait until the page stops issuing network requests.
    ///
    /// # Errors
    ///
    /// Returns an error when the page does not settle within the configured
    /// timeout.
    async fn wait_for_network_idle(&self) -> Result<(), Box<dyn Error>>;

    /// Scroll the viewport down by `dy` pixels.
    async fn scroll_by(&self, dy: i64) -> Result<(), Box<dyn Error>>;

    /// Current `document.body.scrollHeight`.
    async fn scroll_height(&self) -> Result<u64, Box<dyn Error>>;

    /// Resolved `href` of every anchor matching the CSS `selector`.
    async fn anchor_hrefs(&self, selector: &str) -> Result<Vec<String>, Box<dyn Error>>;

    /// Click every visible button whose text contains `label`, pausing for
    /// `pause` after each click. Returns the number of clicks.
    ///
    /// # Errors
    ///
    /// Stops at the first failing lookup or click. The [`ClickError`] keeps
    /// the number of clicks that went through before it.
    async fn click_visible_buttons(
        &self,
        label: &str,
        pause: Duration,
    ) -> Result<usize, ClickError>;

    /// Serialized DOM of the current page.
    async fn content(&self) -> Result<String, Box<dyn Error>>;

    /// Idle for `duration`.
    async fn wait(&self, duration: Duration);
}

/// A button interaction that failed part way.
#[derive(Debug)]
pub struct ClickError {
    /// Clicks completed before the failure.
    pub clicked: usize,
    cause: Box<dyn Error>,
}

impl ClickError {
    pub fn new(clicked: usize, cause: impl Into<Box<dyn Error>>) -> Self {
        Self {
            clicked,
            cause: cause.into(),
        }
    }
}

impl fmt::Display for ClickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.cause.fmt(f)
    }
}

impl Error for ClickError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.cause.as_ref())
    }
}
