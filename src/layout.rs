use std::path::Path;

use crate::formats::ChapterRecord;

pub const MISSING_CHAPTER_LABEL: &str = "no-chapter";
pub const DEFAULT_PAGE_EXTENSION: &str = ".jpg";

/// `{index:03}_cap_{label}`, with path separators and spaces in the label
/// replaced by `_`.
pub fn chapter_dir_name(index: usize, record: &ChapterRecord) -> String {
    let label = record
        .chapter_number
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(MISSING_CHAPTER_LABEL);
    let safe_label = label
        .chars()
        .map(|c| match c {
            '/' | '\\' | ' ' => '_',
            c => c,
        })
        .collect::<String>();
    format!("{index:03}_cap_{safe_label}")
}

/// `{index:03}` plus the server filename's extension.
pub fn page_file_name(index: usize, server_filename: &str) -> String {
    let extension = Path::new(server_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| DEFAULT_PAGE_EXTENSION.to_owned());
    format!("{index:03}{extension}")
}

/// True when `dir` is an existing directory with at least one entry.
pub async fn dir_has_entries(dir: &Path) -> bool {
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return false;
    };
    matches!(entries.next_entry().await, Ok(Some(_)))
}
