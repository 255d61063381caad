use std::io::ErrorKind;
use std::ops::AddAssign;
use std::path::Path;

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt as _, BufWriter};

use crate::client::ApiClient;
use crate::error::FetchError;
use crate::formats::PageManifest;
use crate::layout::page_file_name;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl AddAssign for FetchStats {
    fn add_assign(&mut self, other: Self) {
        self.written += other.written;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageOutcome {
    Written,
    /// The file showed up while the request was in flight.
    AlreadyPresent,
}

/// Downloads every page of `manifest` into `dest` as `001.ext`, `002.ext`, ...
///
/// Pages whose file already exists are skipped without a request. A failed page is
/// counted and the loop moves on; only failing to create `dest` is an error.
pub async fn fetch_pages(
    client: &ApiClient,
    manifest: &PageManifest,
    dest: &Path,
) -> Result<FetchStats, FetchError> {
    tokio::fs::create_dir_all(dest)
        .await
        .map_err(|err| FetchError::io(dest, err))?;

    tracing::info!(
        pages = manifest.page_filenames.len(),
        dest = %dest.display(),
        mode = manifest.mode.segment(),
        "downloading pages"
    );

    let mut stats = FetchStats::default();
    for (offset, filename) in manifest.page_filenames.iter().enumerate() {
        let page = offset + 1;
        let out_path = dest.join(page_file_name(page, filename));

        if tokio::fs::try_exists(&out_path).await.unwrap_or(false) {
            tracing::info!(page, "page already present; skipping");
            stats.skipped += 1;
            continue;
        }

        let url = manifest.page_url(filename);
        match fetch_page(client, &url, &out_path).await {
            Ok(PageOutcome::Written) => {
                tracing::info!(page, "page saved");
                stats.written += 1;
            }
            Ok(PageOutcome::AlreadyPresent) => {
                tracing::info!(page, "page appeared during download; skipping");
                stats.skipped += 1;
            }
            Err(err) => {
                tracing::warn!(page, %url, %err, "page download failed");
                stats.failed += 1;
            }
        }

        tokio::time::sleep(client.config().page_delay).await;
    }

    Ok(stats)
}

async fn fetch_page(
    client: &ApiClient,
    url: &str,
    out_path: &Path,
) -> Result<PageOutcome, FetchError> {
    let mut response = client.get_stream(url).await?;

    let file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(out_path)
        .await
    {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            return Ok(PageOutcome::AlreadyPresent);
        }
        Err(err) => return Err(FetchError::io(out_path, err)),
    };

    let mut writer = BufWriter::new(file);
    if let Err(err) = stream_body(&mut response, &mut writer, out_path).await {
        drop(writer);
        if let Err(remove_err) = tokio::fs::remove_file(out_path).await {
            tracing::debug!(path = %out_path.display(), %remove_err, "remove partial page");
        }
        return Err(err);
    }

    Ok(PageOutcome::Written)
}

async fn stream_body(
    response: &mut reqwest::Response,
    writer: &mut BufWriter<File>,
    out_path: &Path,
) -> Result<(), FetchError> {
    while let Some(chunk) = response.chunk().await? {
        writer
            .write_all(&chunk)
            .await
            .map_err(|err| FetchError::io(out_path, err))?;
    }
    writer
        .flush()
        .await
        .map_err(|err| FetchError::io(out_path, err))
}
