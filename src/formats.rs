use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One chapter as listed by the feed endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChapterRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub language: String,
    pub content_hash: String,
    #[serde(default)]
    pub raw_attributes: Map<String, Value>,
}

impl ChapterRecord {
    /// Builds a record from one element of the feed's `data` array.
    ///
    /// Returns `None` when the element has no usable `id`.
    pub fn from_feed_element(element: &Value) -> Option<Self> {
        let id = element.get("id")?.as_str()?.trim();
        if id.is_empty() {
            return None;
        }

        let attributes = element
            .get("attributes")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        Some(Self {
            id: id.to_owned(),
            chapter_number: string_attr(&attributes, "chapter"),
            title: string_attr(&attributes, "title"),
            language: string_attr(&attributes, "translatedLanguage").unwrap_or_default(),
            content_hash: string_attr(&attributes, "hash").unwrap_or_default(),
            raw_attributes: attributes,
        })
    }
}

fn string_attr(attributes: &Map<String, Value>, key: &str) -> Option<String> {
    match attributes.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub data: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryServer {
    #[serde(rename = "baseUrl", default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub chapter: Option<Map<String, Value>>,
}

/// Which page-list variant a manifest was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    Reduced,
    Full,
}

impl PageMode {
    /// Path segment used in image URLs.
    pub fn segment(self) -> &'static str {
        match self {
            PageMode::Reduced => "data-saver",
            PageMode::Full => "data",
        }
    }
}

/// A chapter resolved for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageManifest {
    pub base_url: String,
    pub content_hash: String,
    pub mode: PageMode,
    pub page_filenames: Vec<String>,
}

impl PageManifest {
    pub fn page_url(&self, filename: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.mode.segment(),
            self.content_hash,
            filename
        )
    }
}
