use std::path::PathBuf;

use anyhow::Context as _;

use crate::cli::{DownloadArgs, ResumeMode};
use crate::client::ApiClient;
use crate::delivery::resolve_pages;
use crate::feed::list_chapters;
use crate::layout::{chapter_dir_name, dir_has_entries};
use crate::order::sort_chapters;
use crate::pages::{FetchStats, fetch_pages};

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub publication_id: String,
    /// `None` lists every language.
    pub language: Option<String>,
    pub base_folder: PathBuf,
    pub prefer_reduced: bool,
    pub resume: ResumeMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub chapters_listed: usize,
    pub chapters_downloaded: usize,
    pub chapters_skipped: usize,
    pub chapters_failed: usize,
    pub pages: FetchStats,
}

pub async fn run(args: DownloadArgs) -> anyhow::Result<()> {
    let config = args.client_config();
    let client = ApiClient::new(config).context("create api client")?;
    let request = DownloadRequest {
        publication_id: args.source.manga.clone(),
        language: args.source.language(),
        base_folder: PathBuf::from(&args.out),
        prefer_reduced: !args.full,
        resume: args.resume,
    };

    let summary = download_publication(&client, &request).await?;
    tracing::info!(
        listed = summary.chapters_listed,
        downloaded = summary.chapters_downloaded,
        skipped = summary.chapters_skipped,
        failed = summary.chapters_failed,
        pages_written = summary.pages.written,
        pages_skipped = summary.pages.skipped,
        pages_failed = summary.pages.failed,
        "download finished"
    );
    Ok(())
}

/// Lists, orders and downloads every chapter of a publication.
///
/// Per-chapter failures are logged and counted; only being unable to create the
/// base folder is an error. Re-running with the same request picks up where the
/// previous run stopped.
pub async fn download_publication(
    client: &ApiClient,
    request: &DownloadRequest,
) -> anyhow::Result<DownloadSummary> {
    let languages = request.language.clone().map(|lang| vec![lang]);
    let mut chapters = list_chapters(client, &request.publication_id, languages.as_deref()).await;

    let mut summary = DownloadSummary {
        chapters_listed: chapters.len(),
        ..DownloadSummary::default()
    };

    if chapters.is_empty() {
        tracing::warn!(
            publication_id = %request.publication_id,
            language = request.language.as_deref().unwrap_or("all"),
            "no chapters found; check the publication id, check that chapters exist in \
             the requested language, or retry with --all-languages"
        );
        return Ok(summary);
    }

    sort_chapters(&mut chapters);

    tokio::fs::create_dir_all(&request.base_folder)
        .await
        .with_context(|| format!("create base folder: {}", request.base_folder.display()))?;

    for (offset, chapter) in chapters.iter().enumerate() {
        let index = offset + 1;
        let chapter_dir = request.base_folder.join(chapter_dir_name(index, chapter));
        tracing::info!(
            index,
            chapter = chapter.chapter_number.as_deref().unwrap_or("-"),
            chapter_id = %chapter.id,
            language = %chapter.language,
            "chapter"
        );

        if request.resume == ResumeMode::Folder && dir_has_entries(&chapter_dir).await {
            tracing::info!(dir = %chapter_dir.display(), "chapter folder not empty; skipping");
            summary.chapters_skipped += 1;
            continue;
        }

        let manifest = match resolve_pages(client, &chapter.id, request.prefer_reduced).await {
            Ok(manifest) => manifest,
            Err(err) => {
                tracing::warn!(chapter_id = %chapter.id, %err, "could not resolve pages; skipping");
                summary.chapters_failed += 1;
                continue;
            }
        };

        match fetch_pages(client, &manifest, &chapter_dir).await {
            Ok(stats) => {
                if stats.failed > 0 {
                    summary.chapters_failed += 1;
                } else {
                    summary.chapters_downloaded += 1;
                }
                summary.pages += stats;
            }
            Err(err) => {
                tracing::warn!(chapter_id = %chapter.id, %err, "chapter download failed");
                summary.chapters_failed += 1;
            }
        }
    }

    Ok(summary)
}
