//! Infinite-scroll loader for the episode listing.
//!
//! The listing page appends episodes lazily as the viewport approaches the
//! bottom. [`scroll_to_end`] keeps scrolling until the document height stops
//! growing.
//!
//! # Termination
//!
//! After each scroll the loader waits one settle delay and samples
//! `document.body.scrollHeight`. When the sample equals the previous one it
//! waits once more and takes a confirmation sample; only if that one matches
//! too does the loop end. A confirmation that differs becomes the new
//! baseline and scrolling resumes.
//!
//! There is no iteration cap: a page that never stops growing keeps the
//! loader busy forever.

use crate::browser::BrowserPage;
use crate::config::ScrollSettings;
use crate::models::ScrollReport;
use std::error::Error;
use tracing::{debug, info, instrument};

/// Scroll `page` until its height is stable, returning what was observed.
///
/// # Errors
///
/// Any scroll or height-sampling failure is returned unchanged.
#[instrument(level = "info", skip_all, fields(step_px = settings.step_px, settle_ms = settings.settle_delay_ms))]
pub async fn scroll_to_end<P: BrowserPage>(
    page: &P,
    settings: &ScrollSettings,
) -> Result<ScrollReport, Box<dyn Error>> {
    info!("Starting infinite scroll");
    let mut report = ScrollReport::default();
    let mut last_height = page.scroll_height().await?;
    report.samples += 1;

    loop {
        page.scroll_by(settings.step_px).await?;
        report.scrolls += 1;
        page.wait(settings.settle_delay()).await;
        let mut new_height = page.scroll_height().await?;
        report.samples += 1;

        if new_height == last_height {
            page.wait(settings.settle_delay()).await;
            new_height = page.scroll_height().await?;
            report.samples += 1;
            if new_height == last_height {
                debug!(height = new_height, "Height confirmed stable");
                break;
            }
        }
        last_height = new_height;
        info!(height = last_height, "Scrolled");
    }

    report.final_height = last_height;
    info!(
        scrolls = report.scrolls,
        samples = report.samples,
        height = report.final_height,
        "Listing fully loaded"
    );
    Ok(report)
}
