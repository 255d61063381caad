use std::path::PathBuf;

use anyhow::Context as _;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt as _;

use crate::cli::ChaptersArgs;
use crate::client::ApiClient;
use crate::feed::list_chapters;
use crate::formats::ChapterRecord;
use crate::order::sort_chapters;

/// Prints the chapters of a publication in download order, one JSON object per line.
pub async fn run(args: ChaptersArgs) -> anyhow::Result<()> {
    let client = ApiClient::new(args.source.client_config()).context("create api client")?;
    let languages = args.source.language().map(|lang| vec![lang]);

    let mut chapters = list_chapters(&client, &args.source.manga, languages.as_deref()).await;
    sort_chapters(&mut chapters);
    let lines = render_records(&chapters)?;

    match args.out.as_deref() {
        Some(out) => {
            let out_path = PathBuf::from(out);
            let mut file = OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&out_path)
                .await
                .with_context(|| format!("create chapter list: {}", out_path.display()))?;
            file.write_all(&lines)
                .await
                .with_context(|| format!("write chapter list: {}", out_path.display()))?;
            file.flush().await.context("flush chapter list")?;
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&lines).await.context("write chapter list")?;
            stdout.flush().await.context("flush chapter list")?;
        }
    }
    Ok(())
}

fn render_records(chapters: &[ChapterRecord]) -> anyhow::Result<Vec<u8>> {
    let mut out = Vec::new();
    for chapter in chapters {
        serde_json::to_writer(&mut out, chapter).context("serialize chapter record")?;
        out.push(b'\n');
    }
    Ok(out)
}
