//! Markdown rendering and file output for archived episodes.
//!
//! Each episode becomes `{output_dir}/{YYYY-MM-DD}_{sanitized_title}.md`.
//! Names are not made unique: two episodes with the same date and sanitized
//! title map to the same file and the later write replaces the earlier one.

use crate::models::EpisodeRecord;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Shown in the date line when the page had no date element.
const UNKNOWN_DATE: &str = "不明";

/// Render an episode into the archive template.
pub fn episode_to_markdown(record: &EpisodeRecord) -> String {
    format!(
        "# {title}\n\n## 概要\n(自動取得された日付: {date})\n\n## AI書き起こし\n{body}\n",
        title = record.title,
        date = record.date_raw.as_deref().unwrap_or(UNKNOWN_DATE),
        body = record.body_text,
    )
}

/// Make a title usable as part of a file name.
///
/// Removes `\ / * ? : " < > |`, `&`, `'` and control characters, and turns
/// spaces into underscores. Length is left alone.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !is_stripped(*c))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

fn is_stripped(c: char) -> bool {
    matches!(
        c,
        '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|' | '&' | '\''
    ) || c.is_control()
}

/// File name for an episode: `{YYYY-MM-DD}_{sanitized_title}.md`.
pub fn episode_filename(record: &EpisodeRecord) -> String {
    format!(
        "{}_{}.md",
        record.file_date.format("%Y-%m-%d"),
        sanitize_title(&record.title)
    )
}

/// Write an episode to `output_dir`, replacing any file with the same name.
///
/// # Returns
///
/// The path of the written file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
#[instrument(level = "info", skip_all, fields(url = %record.url))]
pub async fn write_episode(
    record: &EpisodeRecord,
    output_dir: impl AsRef<Path>,
) -> Result<PathBuf, Box<dyn Error>> {
    let path = output_dir.as_ref().join(episode_filename(record));
    let md = episode_to_markdown(record);
    fs::write(&path, md).await?;
    info!(path = %path.display(), "Saved");
    Ok(path)
}
