use serde_json::{Map, Value};

use crate::client::ApiClient;
use crate::error::FetchError;
use crate::formats::{DeliveryServer, PageManifest, PageMode};

/// Field names carrying the reduced-size page list, in priority order.
const REDUCED_FIELDS: &[&str] = &["dataSaver", "data-saver"];
/// Field names carrying the full-size page list, in priority order.
const FULL_FIELDS: &[&str] = &["data", "data_full"];

/// Asks `/at-home/server/{chapter_id}` where the chapter's images live.
pub async fn resolve_pages(
    client: &ApiClient,
    chapter_id: &str,
    prefer_reduced: bool,
) -> Result<PageManifest, FetchError> {
    let url = client.endpoint(&format!("at-home/server/{chapter_id}"));
    let server: DeliveryServer = client.get_json(&url, &[]).await?;

    let malformed = |detail: &str| FetchError::Malformed {
        url: url.clone(),
        detail: detail.to_owned(),
    };

    let base_url = server
        .base_url
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| malformed("missing baseUrl"))?;
    let chapter = server
        .chapter
        .filter(|c| !c.is_empty())
        .ok_or_else(|| malformed("missing chapter detail"))?;
    let content_hash = chapter
        .get("hash")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed("missing chapter hash"))?
        .to_owned();

    let (mode, page_filenames) =
        select_pages(&chapter, prefer_reduced).ok_or_else(|| FetchError::NoPages {
            chapter_id: chapter_id.to_owned(),
        })?;

    Ok(PageManifest {
        base_url,
        content_hash,
        mode,
        page_filenames,
    })
}

/// Picks the page list to download. A missing reduced list never fails the
/// chapter when a full list exists, and vice versa.
pub fn select_pages(
    chapter: &Map<String, Value>,
    prefer_reduced: bool,
) -> Option<(PageMode, Vec<String>)> {
    let reduced = first_page_list(chapter, REDUCED_FIELDS);
    let full = first_page_list(chapter, FULL_FIELDS);

    match (reduced, full) {
        (Some(pages), _) if prefer_reduced => Some((PageMode::Reduced, pages)),
        (_, Some(pages)) => Some((PageMode::Full, pages)),
        (Some(pages), None) => Some((PageMode::Reduced, pages)),
        (None, None) => None,
    }
}

fn first_page_list(chapter: &Map<String, Value>, fields: &[&str]) -> Option<Vec<String>> {
    fields.iter().find_map(|field| {
        let pages = chapter
            .get(*field)?
            .as_array()?
            .iter()
            .filter_map(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect::<Vec<_>>();
        (!pages.is_empty()).then_some(pages)
    })
}
