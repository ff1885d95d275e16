//! [`BrowserPage`] backed by a W3C WebDriver session.
//!
//! Talks to chromedriver (or any compatible endpoint) through `fantoccini`.
//! Start the driver before crawling:
//!
//! ```sh
//! chromedriver --port=4444
//! ```

use super::{BrowserPage, ClickError};
use crate::config::BrowserSettings;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Value, json};
use std::error::Error;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, instrument, warn};

const READY_STATE_AND_RESOURCES: &str =
    "return [document.readyState, performance.getEntriesByType('resource').length];";
const SCROLL_BY: &str = "window.scrollBy(0, arguments[0]);";
const SCROLL_HEIGHT: &str = "return document.body ? document.body.scrollHeight : 0;";
const ANCHOR_HREFS: &str =
    "return Array.from(document.querySelectorAll(arguments[0])).map(a => a.href);";

/// A single tab of a WebDriver-controlled browser.
pub struct WebDriverPage {
    client: Client,
    settings: BrowserSettings,
}

impl WebDriverPage {
    /// Open a new WebDriver session with Chrome.
    ///
    /// # Errors
    ///
    /// Returns an error if the WebDriver endpoint is unreachable or refuses
    /// to start a session.
    #[instrument(level = "info", skip_all, fields(webdriver_url = %settings.webdriver_url, headless = settings.headless))]
    pub async fn connect(settings: &BrowserSettings) -> Result<Self, Box<dyn Error>> {
        let mut args = vec!["--disable-gpu", "--window-size=1280,2000"];
        if settings.headless {
            args.push("--headless=new");
        }
        let mut capabilities = serde_json::Map::new();
        capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities);
        let client = builder.connect(&settings.webdriver_url).await?;
        info!("WebDriver session started");

        Ok(Self {
            client,
            settings: settings.clone(),
        })
    }

    /// End the WebDriver session and close the browser.
    pub async fn close(self) -> Result<(), Box<dyn Error>> {
        self.client.close().await?;
        info!("WebDriver session closed");
        Ok(())
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, Box<dyn Error>> {
        Ok(self.client.execute(script, args).await?)
    }
}

impl BrowserPage for WebDriverPage {
    #[instrument(level = "debug", skip(self))]
    async fn goto(&self, url: &str) -> Result<(), Box<dyn Error>> {
        self.client.goto(url).await?;
        Ok(())
    }

    /// Polls `document.readyState` and the number of performance resource
    /// entries until the page is complete and the count holds still for one
    /// poll interval.
    async fn wait_for_network_idle(&self) -> Result<(), Box<dyn Error>> {
        let timeout = self.settings.network_idle_timeout();
        let deadline = Instant::now() + timeout;
        let mut tracker = IdleTracker::default();

        loop {
            let state = self.execute(READY_STATE_AND_RESOURCES, vec![]).await?;
            let count = state[1].as_u64().unwrap_or(0);
            match tracker.observe(state[0].as_str(), count, Instant::now() >= deadline) {
                IdleCheck::Idle => {
                    debug!(resources = count, "Network idle");
                    return Ok(());
                }
                IdleCheck::TimedOut => {
                    warn!(?timeout, resources = count, "Page never went idle");
                    return Err(
                        format!("timed out after {timeout:?} waiting for network idle").into(),
                    );
                }
                IdleCheck::Pending => sleep(self.settings.network_idle_poll()).await,
            }
        }
    }

    async fn scroll_by(&self, dy: i64) -> Result<(), Box<dyn Error>> {
        self.execute(SCROLL_BY, vec![json!(dy)]).await?;
        Ok(())
    }

    async fn scroll_height(&self) -> Result<u64, Box<dyn Error>> {
        let value = self.execute(SCROLL_HEIGHT, vec![]).await?;
        value
            .as_u64()
            .or_else(|| value.as_f64().map(|h| h as u64))
            .ok_or_else(|| format!("unexpected scrollHeight value: {value}").into())
    }

    async fn anchor_hrefs(&self, selector: &str) -> Result<Vec<String>, Box<dyn Error>> {
        let value = self.execute(ANCHOR_HREFS, vec![json!(selector)]).await?;
        Ok(value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn click_visible_buttons(
        &self,
        label: &str,
        pause: Duration,
    ) -> Result<usize, ClickError> {
        let xpath = button_xpath(label);
        let buttons = self
            .client
            .find_all(Locator::XPath(&xpath))
            .await
            .map_err(|e| ClickError::new(0, e))?;
        debug!(found = buttons.len(), %label, "Expand buttons located");

        let mut clicked = 0;
        for button in buttons {
            let shown = button
                .is_displayed()
                .await
                .map_err(|e| ClickError::new(clicked, e))?;
            if shown {
                button
                    .click()
                    .await
                    .map_err(|e| ClickError::new(clicked, e))?;
                clicked += 1;
                sleep(pause).await;
            }
        }
        Ok(clicked)
    }

    async fn content(&self) -> Result<String, Box<dyn Error>> {
        Ok(self.client.source().await?)
    }

    async fn wait(&self, duration: Duration) {
        sleep(duration).await;
    }
}

/// Verdict on one network-idle sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdleCheck {
    Idle,
    Pending,
    TimedOut,
}

/// Remembers the resource count of the previous sample.
///
/// The page is idle once `readyState` is `complete` and the count equals the
/// one seen a poll interval earlier. A settled sample wins over an expired
/// deadline.
#[derive(Debug, Default)]
struct IdleTracker {
    last_count: Option<u64>,
}

impl IdleTracker {
    fn observe(&mut self, ready_state: Option<&str>, resources: u64, expired: bool) -> IdleCheck {
        let settled = ready_state == Some("complete") && self.last_count == Some(resources);
        self.last_count = Some(resources);
        if settled {
            IdleCheck::Idle
        } else if expired {
            IdleCheck::TimedOut
        } else {
            IdleCheck::Pending
        }
    }
}

/// XPath selecting `<button>` elements whose normalized text contains `label`.
fn button_xpath(label: &str) -> String {
    format!(
        "//button[contains(normalize-space(.), {})]",
        xpath_literal(label)
    )
}

/// Quote `s` as an XPath 1.0 string literal.
///
/// XPath 1.0 has no escape sequences, so strings holding both quote kinds are
/// assembled with `concat()`.
fn xpath_literal(s: &str) -> String {
    if !s.contains('"') {
        format!("\"{s}\"")
    } else if !s.contains('\'') {
        format!("'{s}'")
    } else {
        let parts = s
            .split('"')
            .map(|part| format!("\"{part}\""))
            .collect::<Vec<_>>()
            .join(", '\"', ");
        format!("concat({parts})")
    }
}
