//! In-memory [`BrowserPage`] for tests.

use super::{BrowserPage, ClickError};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::error::Error;
use std::time::Duration;

/// Scripted page: heights are served in order, URLs map to fixture HTML.
#[derive(Default)]
pub struct FakePage {
    heights: RefCell<VecDeque<u64>>,
    listing_hrefs: Vec<String>,
    pages: HashMap<String, String>,
    broken_urls: HashSet<String>,
    idle_timeout_urls: HashSet<String>,
    expand_result: Option<Result<usize, (usize, String)>>,
    current: RefCell<Option<String>>,
    pub visited: RefCell<Vec<String>>,
    pub height_reads: Cell<usize>,
    pub scrolls: Cell<usize>,
    pub waits: RefCell<Vec<Duration>>,
    pub expand_calls: Cell<usize>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_heights(self, heights: &[u64]) -> Self {
        *self.heights.borrow_mut() = heights.iter().copied().collect();
        self
    }

    pub fn with_listing(mut self, hrefs: &[&str]) -> Self {
        self.listing_hrefs = hrefs.iter().map(|h| h.to_string()).collect();
        self
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn with_broken_url(mut self, url: &str) -> Self {
        self.broken_urls.insert(url.to_string());
        self
    }

    /// `url` loads but never goes network-idle.
    pub fn with_idle_timeout(mut self, url: &str) -> Self {
        self.idle_timeout_urls.insert(url.to_string());
        self
    }

    pub fn with_expand_result(mut self, result: Result<usize, String>) -> Self {
        self.expand_result = Some(result.map_err(|message| (0, message)));
        self
    }

    /// The expand interaction fails after `clicked` successful clicks.
    pub fn with_expand_failure_after(mut self, clicked: usize, message: &str) -> Self {
        self.expand_result = Some(Err((clicked, message.to_string())));
        self
    }
}

impl BrowserPage for FakePage {
    async fn goto(&self, url: &str) -> Result<(), Box<dyn Error>> {
        if self.broken_urls.contains(url) {
            return Err(format!("net::ERR_NAME_NOT_RESOLVED at {url}").into());
        }
        self.visited.borrow_mut().push(url.to_string());
        *self.current.borrow_mut() = Some(url.to_string());
        Ok(())
    }

    async fn wait_for_network_idle(&self) -> Result<(), Box<dyn Error>> {
        match self.current.borrow().as_deref() {
            Some(url) if self.idle_timeout_urls.contains(url) => {
                Err(format!("timed out waiting for network idle at {url}").into())
            }
            _ => Ok(()),
        }
    }

    async fn scroll_by(&self, _dy: i64) -> Result<(), Box<dyn Error>> {
        self.scrolls.set(self.scrolls.get() + 1);
        Ok(())
    }

    async fn scroll_height(&self) -> Result<u64, Box<dyn Error>> {
        self.height_reads.set(self.height_reads.get() + 1);
        self.heights
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| "height sequence exhausted".into())
    }

    async fn anchor_hrefs(&self, _selector: &str) -> Result<Vec<String>, Box<dyn Error>> {
        Ok(self.listing_hrefs.clone())
    }

    async fn click_visible_buttons(
        &self,
        _label: &str,
        _pause: Duration,
    ) -> Result<usize, ClickError> {
        self.expand_calls.set(self.expand_calls.get() + 1);
        match &self.expand_result {
            Some(Ok(count)) => Ok(*count),
            Some(Err((clicked, message))) => Err(ClickError::new(*clicked, message.clone())),
            None => Ok(0),
        }
    }

    async fn content(&self) -> Result<String, Box<dyn Error>> {
        let current = self.current.borrow();
        let url = current.as_deref().ok_or("no page loaded")?;
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| format!("no fixture for {url}").into())
    }

    async fn wait(&self, duration: Duration) {
        self.waits.borrow_mut().push(duration);
    }
}
