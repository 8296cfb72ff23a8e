use std::path::{Path, PathBuf};

use log::{debug, warn};

pub const POSTS_DIR: &str = "_posts";

const RADIOSHOW_SUFFIX: &str = "radioshow.md";

/// Collects all radio-show posts under `posts_dir`, sorted by path.
pub fn find_radioshow_posts(posts_dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(posts_dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(
                "Failed to read posts directory {}: {}",
                posts_dir.display(),
                err
            );
            return Vec::new();
        }
    };

    let mut posts = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(
                    "Failed to read a directory entry in {}: {}",
                    posts_dir.display(),
                    err
                );
                continue;
            }
        };

        let path = entry.path();
        let matches_suffix = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.ends_with(RADIOSHOW_SUFFIX))
            .unwrap_or(false);
        if matches_suffix && path.is_file() {
            posts.push(path);
        }
    }

    posts.sort_unstable();
    posts
}
