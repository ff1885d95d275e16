//! Embedded-state inspector.
//!
//! Single-page apps often ship their data as JSON inside the HTML, either as
//! `<script type="application/json">` blocks or as `window.__STATE__ = {...};`
//! assignments. When the DOM selectors stop matching, these are the first
//! place to look. `sniff` lists both kinds with a short preview.

use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use tracing::{info, instrument};
use url::Url;

const PREVIEW_CHARS: usize = 200;

static JSON_SCRIPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<script[^>]*type="application/json"[^>]*>(.*?)</script>"#)
        .expect("valid regex")
});

static GLOBAL_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)window\.(__[A-Z_]+__)\s*=\s*(\{.*?\});").expect("valid regex")
});

/// A `window.__NAME__ = {...};` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalAssignment {
    pub name: String,
    pub payload: String,
}

/// What was found in one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SniffReport {
    pub json_scripts: Vec<String>,
    pub assignments: Vec<GlobalAssignment>,
}

/// Bodies of every `<script type="application/json">` element.
pub fn find_json_scripts(html: &str) -> Vec<String> {
    JSON_SCRIPT
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Every `window.__NAME__ = {...};` assignment, shortest match per object.
pub fn find_global_assignments(html: &str) -> Vec<GlobalAssignment> {
    GLOBAL_ASSIGNMENT
        .captures_iter(html)
        .map(|caps| GlobalAssignment {
            name: caps[1].to_string(),
            payload: caps[2].to_string(),
        })
        .collect()
}

/// Collect both kinds of embedded state from one page.
pub fn inspect(html: &str) -> SniffReport {
    SniffReport {
        json_scripts: find_json_scripts(html),
        assignments: find_global_assignments(html),
    }
}

/// Read HTML from a local file or, for `http(s)` sources, over the network.
async fn load_source(source: &str) -> Result<String, Box<dyn Error>> {
    match Url::parse(source) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            info!(%url, "Fetching page");
            Ok(reqwest::get(url).await?.error_for_status()?.text().await?)
        }
        _ => Ok(tokio::fs::read_to_string(source).await?),
    }
}

/// Inspect `source` and log everything found.
#[instrument(level = "info")]
pub async fn sniff(source: &str) -> Result<SniffReport, Box<dyn Error>> {
    let html = load_source(source).await?;
    let report = inspect(&html);

    info!(count = report.json_scripts.len(), "Found JSON scripts");
    for (i, script) in report.json_scripts.iter().enumerate() {
        info!(index = i, preview = %truncate_for_log(script.trim(), PREVIEW_CHARS), "JSON script");
    }
    info!(count = report.assignments.len(), "Found global assignments");
    for (i, assignment) in report.assignments.iter().enumerate() {
        info!(
            index = i,
            name = %assignment.name,
            preview = %truncate_for_log(&assignment.payload, PREVIEW_CHARS),
            "Global assignment"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head>
<script id="__NEXT_DATA__" type="application/json">{"props":{"story":1}}</script>
<script type="text/javascript">var ignored = {};</script>
<script type="application/json">
  {"multi": "line"}
</script>
<script>window.__INITIAL_STATE__ = {"channel": {"id": 3577}};
window.__APOLLO_STATE__={"a":1};</script>
</head><body></body></html>"#;

    #[test]
    fn test_find_json_scripts() {
        let scripts = find_json_scripts(PAGE);
        assert_eq!(scripts.len(), 2);
        assert_eq!(scripts[0], r#"{"props":{"story":1}}"#);
        assert_eq!(scripts[1].trim(), r#"{"multi": "line"}"#);
    }

    #[test]
    fn test_find_global_assignments() {
        let found = find_global_assignments(PAGE);
        assert_eq!(
            found,
            vec![
                GlobalAssignment {
                    name: "__INITIAL_STATE__".to_string(),
                    payload: r#"{"channel": {"id": 3577}}"#.to_string(),
                },
                GlobalAssignment {
                    name: "__APOLLO_STATE__".to_string(),
                    payload: r#"{"a":1}"#.to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_plain_page_has_nothing() {
        assert_eq!(inspect("<html><body>hi</body></html>"), SniffReport::default());
    }

    #[tokio::test]
    async fn test_sniff_local_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, PAGE).unwrap();

        let report = sniff(path.to_str().unwrap()).await.unwrap();
        assert_eq!(report.json_scripts.len(), 2);
        assert_eq!(report.assignments.len(), 2);
    }

    #[tokio::test]
    async fn test_sniff_missing_file_is_error() {
        assert!(sniff("/nonexistent/page.html").await.is_err());
    }
}
