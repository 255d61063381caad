use crate::client::ApiClient;
use crate::formats::{ChapterRecord, FeedPage};

/// Walks `/manga/{id}/feed` page by page and collects every chapter.
///
/// Listing stops at an empty page or a page shorter than the configured page size.
/// Any failure ends listing early and returns what was gathered so far, so an empty
/// or short result may be incomplete.
pub async fn list_chapters(
    client: &ApiClient,
    publication_id: &str,
    languages: Option<&[String]>,
) -> Vec<ChapterRecord> {
    let page_size = client.config().page_size.max(1);
    let url = client.endpoint(&format!("manga/{publication_id}/feed"));
    let languages = languages.filter(|langs| !langs.is_empty());

    tracing::info!(publication_id, page_size, "listing chapters");

    let mut offset = 0_usize;
    let mut chapters = Vec::new();
    loop {
        let query = feed_query(page_size, offset, languages);
        let page = match client.get_json::<FeedPage>(&url, &query).await {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!(offset, %err, "feed request failed; stopping listing");
                break;
            }
        };

        let received = page.data.len();
        tracing::info!(offset, received, "feed page");
        if received == 0 {
            break;
        }

        for element in &page.data {
            match ChapterRecord::from_feed_element(element) {
                Some(record) => chapters.push(record),
                None => tracing::warn!(offset, "feed element without id; skipping"),
            }
        }

        if received < page_size {
            break;
        }
        offset += received;
        tokio::time::sleep(client.config().list_delay).await;
    }

    tracing::info!(total = chapters.len(), "chapters listed");
    chapters
}

fn feed_query(
    page_size: usize,
    offset: usize,
    languages: Option<&[String]>,
) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("limit", page_size.to_string()),
        ("offset", offset.to_string()),
        ("order[chapter]", "asc".to_owned()),
    ];
    for lang in languages.unwrap_or_default() {
        query.push(("translatedLanguage[]", lang.clone()));
    }
    query
}
