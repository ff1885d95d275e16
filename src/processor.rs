//! Per-episode processing: navigate, expand, extract.

use crate::browser::BrowserPage;
use crate::config::CrawlerConfig;
use crate::extract::{EpisodeExtractor, resolve_file_date};
use crate::models::{EpisodeRecord, ExpandOutcome};
use chrono::{Local, NaiveDate};
use scraper::Html;
use std::error::Error;
use tracing::{debug, info, instrument, warn};

/// Result of processing one episode page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedEpisode {
    pub record: EpisodeRecord,
    pub expand: ExpandOutcome,
}

/// Click the "show more" buttons, converting any failure into an outcome.
pub async fn expand_transcript<P: BrowserPage>(page: &P, config: &CrawlerConfig) -> ExpandOutcome {
    match page
        .click_visible_buttons(&config.expand_button_label, config.expand_click_delay())
        .await
    {
        Ok(0) => {
            debug!("No expand button visible");
            ExpandOutcome::nothing_to_expand()
        }
        Ok(clicked) => {
            debug!(clicked, "Expanded transcript");
            ExpandOutcome::clicked(clicked)
        }
        Err(e) => {
            warn!(clicked = e.clicked, error = %e, "Could not click 'show more' (might not exist)");
            ExpandOutcome::failed(e.clicked, e.to_string())
        }
    }
}

/// Build an [`EpisodeRecord`] from rendered page HTML.
///
/// `today` replaces a missing or unparseable date.
pub fn extract_record<E: EpisodeExtractor>(
    extractor: &E,
    url: &str,
    html: &str,
    today: NaiveDate,
) -> EpisodeRecord {
    let doc = Html::parse_document(html);
    let title = extractor.extract_title(&doc);
    let date_raw = extractor.extract_date(&doc);
    let file_date = resolve_file_date(date_raw.as_deref(), today);
    if date_raw.is_none() {
        debug!(%url, %file_date, "No date element; using today");
    }
    let body_text = extractor.extract_body(&doc);

    EpisodeRecord {
        url: url.to_string(),
        title,
        date_raw,
        file_date,
        body_text,
    }
}

/// Visit one episode page and extract its fields.
///
/// # Errors
///
/// Navigation, idle-wait and content retrieval failures are returned; a
/// failing expand interaction is not.
#[instrument(level = "info", skip(page, config, extractor))]
pub async fn process_episode<P, E>(
    page: &P,
    url: &str,
    config: &CrawlerConfig,
    extractor: &E,
) -> Result<ProcessedEpisode, Box<dyn Error>>
where
    P: BrowserPage,
    E: EpisodeExtractor,
{
    info!("Processing");
    page.goto(url).await?;
    page.wait_for_network_idle().await?;

    let expand = expand_transcript(page, config).await;
    let html = page.content().await?;
    let record = extract_record(extractor, url, &html, Local::now().date_naive());
    info!(
        title = %record.title,
        file_date = %record.file_date,
        body_chars = record.body_text.chars().count(),
        "Extracted episode"
    );

    Ok(ProcessedEpisode { record, expand })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::FakePage;
    use crate::extract::HtmlEpisodeExtractor;
    use crate::models::NO_TITLE;

    const URL: &str = "https://voicy.jp/channel/3577/600001";
    const PAGE: &str = r#"<html><body>
        <header>MENU</header>
        <h1>年末のご挨拶</h1>
        <time>2023年12月30日</time>
        <article><p>今年もありがとうございました。</p></article>
    </body></html>"#;

    #[tokio::test]
    async fn test_process_episode_extracts_fields() {
        let page = FakePage::new().with_page(URL, PAGE).with_expand_result(Ok(1));
        let processed = process_episode(&page, URL, &CrawlerConfig::default(), &HtmlEpisodeExtractor)
            .await
            .unwrap();

        assert_eq!(processed.record.title, "年末のご挨拶");
        assert_eq!(processed.record.date_raw.as_deref(), Some("2023年12月30日"));
        assert_eq!(
            processed.record.file_date,
            NaiveDate::from_ymd_opt(2023, 12, 30).unwrap()
        );
        assert_eq!(processed.record.body_text, "今年もありがとうございました。");
        assert_eq!(processed.expand, ExpandOutcome::clicked(1));
        assert_eq!(*page.visited.borrow(), vec![URL.to_string()]);
    }

    #[tokio::test]
    async fn test_expand_failure_is_not_fatal() {
        let page = FakePage::new()
            .with_page(URL, PAGE)
            .with_expand_result(Err("stale element reference".to_string()));
        let processed = process_episode(&page, URL, &CrawlerConfig::default(), &HtmlEpisodeExtractor)
            .await
            .unwrap();

        assert!(processed.expand.attempted);
        assert!(!processed.expand.succeeded);
        assert_eq!(processed.expand.error.as_deref(), Some("stale element reference"));
        assert_eq!(processed.record.title, "年末のご挨拶");
    }

    #[tokio::test]
    async fn test_expand_failure_keeps_partial_click_count() {
        let page = FakePage::new()
            .with_page(URL, PAGE)
            .with_expand_failure_after(2, "element click intercepted");
        let outcome = expand_transcript(&page, &CrawlerConfig::default()).await;

        assert_eq!(
            outcome,
            ExpandOutcome::failed(2, "element click intercepted")
        );
        assert_eq!(outcome.clicked, 2);
    }

    #[tokio::test]
    async fn test_no_expand_button() {
        let page = FakePage::new().with_page(URL, PAGE);
        let outcome = expand_transcript(&page, &CrawlerConfig::default()).await;
        assert_eq!(outcome, ExpandOutcome::nothing_to_expand());
        assert_eq!(page.expand_calls.get(), 1);
    }

    #[tokio::test]
    async fn test_navigation_failure_is_fatal() {
        let page = FakePage::new().with_broken_url(URL);
        let result =
            process_episode(&page, URL, &CrawlerConfig::default(), &HtmlEpisodeExtractor).await;
        assert!(result.is_err());
        assert_eq!(page.expand_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_network_idle_timeout_is_fatal() {
        let page = FakePage::new()
            .with_page(URL, PAGE)
            .with_expand_result(Ok(1))
            .with_idle_timeout(URL);
        let err = process_episode(&page, URL, &CrawlerConfig::default(), &HtmlEpisodeExtractor)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("network idle"));
        assert_eq!(*page.visited.borrow(), vec![URL.to_string()]);
        assert_eq!(page.expand_calls.get(), 0);
    }

    #[test]
    fn test_extract_record_fallbacks() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let record = extract_record(
            &HtmlEpisodeExtractor,
            URL,
            "<html><body><p>only text</p></body></html>",
            today,
        );
        assert_eq!(record.title, NO_TITLE);
        assert_eq!(record.date_raw, None);
        assert_eq!(record.file_date, today);
        assert_eq!(record.body_text, "only text");
    }

    #[test]
    fn test_extract_record_yearless_date_uses_today() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let record = extract_record(
            &HtmlEpisodeExtractor,
            URL,
            "<html><body><h1>t</h1><time>12/30</time></body></html>",
            today,
        );
        assert_eq!(record.date_raw.as_deref(), Some("12/30"));
        assert_eq!(record.file_date, today);
    }

    struct FixedExtractor;

    impl EpisodeExtractor for FixedExtractor {
        fn extract_title(&self, _doc: &Html) -> String {
            "fixed".to_string()
        }
        fn extract_date(&self, _doc: &Html) -> Option<String> {
            Some("2001/02/03".to_string())
        }
        fn extract_body(&self, _doc: &Html) -> String {
            "body".to_string()
        }
    }

    #[test]
    fn test_extractor_is_swappable() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let record = extract_record(&FixedExtractor, URL, "<p>ignored</p>", today);
        assert_eq!(record.title, "fixed");
        assert_eq!(record.file_date, NaiveDate::from_ymd_opt(2001, 2, 3).unwrap());
    }
}
