//! Crawler configuration.
//!
//! A single [`CrawlerConfig`] is built at start-up and passed by reference to
//! every pipeline stage. Values are layered in this order:
//!
//! 1. Built-in defaults (the Voicy channel `3577`, `drafts/voicy_history`, ...)
//! 2. An optional YAML file given with `--config`
//! 3. Command-line flags and environment variables
//!
//! # Example `config.yaml`
//!
//! ```yaml
//! channel_id: "3577"
//! output_dir: drafts/voicy_history
//! scroll:
//!   settle_delay_ms: 2500
//! browser:
//!   webdriver_url: http://localhost:9515
//!   headless: false
//! ```

use crate::cli::CrawlArgs;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Top-level configuration for one crawl run.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Channel whose episodes are archived.
    pub channel_id: String,
    /// Site root; the listing lives at `{base_url}/channel/{channel_id}/all`.
    pub base_url: String,
    /// Directory that receives one Markdown file per episode.
    pub output_dir: String,
    /// CSS selector for episode anchors on the listing page.
    pub link_selector: String,
    /// Visible text of the "show more" button on episode pages.
    pub expand_button_label: String,
    /// Pause after each successful expand click.
    pub expand_click_delay_ms: u64,
    /// Pause between two episodes.
    pub politeness_delay_ms: u64,
    pub scroll: ScrollSettings,
    pub browser: BrowserSettings,
}

/// Parameters of the infinite-scroll loop.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ScrollSettings {
    /// Vertical distance scrolled per step, in CSS pixels.
    pub step_px: i64,
    /// Wait between a scroll and the next height sample.
    pub settle_delay_ms: u64,
}

/// WebDriver session parameters.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub headless: bool,
    /// Upper bound for the network-idle wait after navigation.
    pub network_idle_timeout_ms: u64,
    /// Interval between two resource-count samples while waiting for idle.
    pub network_idle_poll_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            channel_id: "3577".to_string(),
            base_url: "https://voicy.jp".to_string(),
            output_dir: "drafts/voicy_history".to_string(),
            link_selector: "a.story-item-container".to_string(),
            expand_button_label: "もっと見る".to_string(),
            expand_click_delay_ms: 500,
            politeness_delay_ms: 1000,
            scroll: ScrollSettings::default(),
            browser: BrowserSettings::default(),
        }
    }
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            step_px: 5000,
            settle_delay_ms: 2000,
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            headless: true,
            network_idle_timeout_ms: 30_000,
            network_idle_poll_ms: 500,
        }
    }
}

impl ScrollSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl BrowserSettings {
    pub fn network_idle_timeout(&self) -> Duration {
        Duration::from_millis(self.network_idle_timeout_ms)
    }

    pub fn network_idle_poll(&self) -> Duration {
        Duration::from_millis(self.network_idle_poll_ms)
    }
}

impl CrawlerConfig {
    /// Load configuration from an optional YAML file, falling back to defaults.
    ///
    /// Missing keys in the file keep their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML for
    /// this schema.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, Box<dyn Error>> {
        match path {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path).await?;
                let config = Self::from_yaml(&raw)?;
                info!(path, channel_id = %config.channel_id, "Loaded configuration file");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse a YAML document into a configuration.
    pub fn from_yaml(raw: &str) -> Result<Self, Box<dyn Error>> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Apply command-line overrides on top of the loaded values.
    pub fn with_overrides(mut self, args: &CrawlArgs) -> Self {
        if let Some(channel_id) = &args.channel_id {
            self.channel_id = channel_id.clone();
        }
        if let Some(output_dir) = &args.output_dir {
            self.output_dir = output_dir.clone();
        }
        if let Some(webdriver_url) = &args.webdriver_url {
            self.browser.webdriver_url = webdriver_url.clone();
        }
        if args.headed {
            self.browser.headless = false;
        }
        self
    }

    /// Path segment that marks a URL as belonging to the configured channel.
    pub fn channel_segment(&self) -> String {
        format!("/channel/{}/", self.channel_id)
    }

    /// Absolute URL of the channel's "all episodes" listing.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn listing_url(&self) -> Result<Url, Box<dyn Error>> {
        let mut base = Url::parse(&self.base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base.join(&format!("channel/{}/all", self.channel_id))?)
    }

    pub fn expand_click_delay(&self) -> Duration {
        Duration::from_millis(self.expand_click_delay_ms)
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}
