use std::path::PathBuf;

/// Outcome of a single network-backed step. Every variant is a soft failure:
/// callers log it and move on at the smallest applicable granularity.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("malformed response from {url}: {detail}")]
    Malformed { url: String, detail: String },

    #[error("no pages found for chapter {chapter_id}")]
    NoPages { chapter_id: String },

    #[error("write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
