use std::path::PathBuf;

use clap::Parser;

/// Fetch Archive.org audio metadata and inject it into post front matter.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Cli {
    /// Path to the post to update
    pub post: Option<PathBuf>,

    /// Archive.org identifier to use instead of extracting one from the post
    #[arg(long)]
    pub id: Option<String>,

    /// Process all radioshow posts in _posts
    #[arg(long)]
    pub all: bool,

    /// Don't write any files
    #[arg(long)]
    pub dry_run: bool,

    /// Copy the original post into scripts/backups before editing
    #[arg(long)]
    pub backup: bool,

    /// HEAD the download URL when the metadata reports no size
    #[arg(long)]
    pub head_fallback: bool,

    /// Network timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Number of retries for network calls
    #[arg(long, default_value_t = 2)]
    pub retries: u32,

    /// Write a JSON report of all outcomes to the given path
    #[arg(long)]
    pub report: Option<PathBuf>,
}
