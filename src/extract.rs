//! Field extraction from episode pages.
//!
//! All knowledge of the episode page markup lives behind [`EpisodeExtractor`].
//! [`HtmlEpisodeExtractor`] implements it for the current site structure:
//!
//! | Field | Source | Fallback |
//! |-------|--------|----------|
//! | title | first `h1` | [`NO_TITLE`] |
//! | date  | first `time` | none (caller substitutes today) |
//! | body  | first `article` | `body` |

use crate::models::NO_TITLE;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("valid selector"));
static TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time").expect("valid selector"));
static ARTICLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article").expect("valid selector"));
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("valid selector"));

/// `YYYY/MM/DD`, `YYYY.MM.DD` and `YYYY年MM月DD日`, and mixes of them.
static DATE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]{4})[./年]([0-9]{1,2})[./月]([0-9]{1,2})").expect("valid regex")
});

/// Site-specific extraction of episode fields from a parsed document.
pub trait EpisodeExtractor {
    fn extract_title(&self, doc: &Html) -> String;

    /// Raw text of the date element, if the page has one.
    fn extract_date(&self, doc: &Html) -> Option<String>;

    fn extract_body(&self, doc: &Html) -> String;
}

/// Heuristic extractor for Voicy episode pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlEpisodeExtractor;

impl EpisodeExtractor for HtmlEpisodeExtractor {
    fn extract_title(&self, doc: &Html) -> String {
        doc.select(&H1)
            .next()
            .map(stripped_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TITLE.to_string())
    }

    fn extract_date(&self, doc: &Html) -> Option<String> {
        doc.select(&TIME).next().map(stripped_text)
    }

    /// Text nodes of the `article` (or `body`) container, stripped and joined
    /// by newlines. Script and style contents are skipped.
    fn extract_body(&self, doc: &Html) -> String {
        let container = doc
            .select(&ARTICLE)
            .next()
            .or_else(|| doc.select(&BODY).next());
        container.map(text_lines).unwrap_or_default()
    }
}

/// Concatenate the stripped text nodes of `element`.
fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

fn text_lines(element: ElementRef<'_>) -> String {
    element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let in_code = node
                .parent()
                .and_then(|p| p.value().as_element().map(|e| e.name()))
                .is_some_and(|name| matches!(name, "script" | "style" | "noscript"));
            if in_code {
                return None;
            }
            let trimmed = text.trim();
            (!trimmed.is_empty()).then_some(trimmed)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Find the first date token in `raw` and turn it into a calendar date.
///
/// Returns `None` when there is no token or it names an impossible date.
pub fn parse_date_token(raw: &str) -> Option<NaiveDate> {
    let caps = DATE_TOKEN.captures(raw)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Date used in the file name: the parsed token, or `today`.
pub fn resolve_file_date(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    raw.and_then(parse_date_token).unwrap_or(today)
}
