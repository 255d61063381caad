use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::client::{ClientConfig, MIN_LIST_DELAY, MIN_PAGE_DELAY};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download every chapter of a manga into numbered folders.
    Download(DownloadArgs),
    /// Print the chapter list in download order as JSON lines.
    Chapters(ChaptersArgs),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ResumeMode {
    /// Skip any chapter whose folder already has files.
    #[default]
    Folder,
    /// Always revisit chapters; only pages already on disk are skipped.
    Page,
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Manga id.
    #[arg(long)]
    pub manga: String,

    /// Translation language code.
    #[arg(long = "lang", default_value = "pt-br")]
    pub lang: String,

    /// List chapters in every language (ignores --lang).
    #[arg(long, conflicts_with = "lang")]
    pub all_languages: bool,

    /// API origin (default: $MANGAFETCH_API_BASE or https://api.mangadex.org).
    #[arg(long)]
    pub api_base: Option<String>,

    /// Chapters requested per feed page.
    #[arg(long, default_value_t = 100)]
    pub page_size: usize,

    /// Delay between feed page requests (at least 250 ms).
    #[arg(long, default_value_t = 250)]
    pub list_delay_ms: u64,
}

impl SourceArgs {
    pub fn language(&self) -> Option<String> {
        (!self.all_languages).then(|| self.lang.clone())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_base: ClientConfig::resolve_api_base(self.api_base.as_deref()),
            page_size: self.page_size.max(1),
            list_delay: Duration::from_millis(self.list_delay_ms).max(MIN_LIST_DELAY),
            ..ClientConfig::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Base output directory (one subfolder per chapter).
    #[arg(long, default_value = "manga")]
    pub out: String,

    /// Download full-size pages instead of reduced-size ones.
    #[arg(long)]
    pub full: bool,

    /// Resume granularity for chapters left by a previous run.
    #[arg(long, value_enum, default_value_t = ResumeMode::Folder)]
    pub resume: ResumeMode,

    /// Delay after each page download attempt (at least 100 ms).
    #[arg(long, default_value_t = 150)]
    pub page_delay_ms: u64,
}

impl DownloadArgs {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            page_delay: Duration::from_millis(self.page_delay_ms).max(MIN_PAGE_DELAY),
            ..self.source.client_config()
        }
    }
}

#[derive(Debug, Args)]
pub struct ChaptersArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output file for the JSON lines (default: stdout).
    #[arg(long)]
    pub out: Option<String>,
}
