use std::sync::LazyLock;

use regex::Regex;

static ARCHIVE_ITEM_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"archive\.org/(?:details|embed)/([\w\-.]+)").unwrap());

/// Scans post text for an embedded Archive.org item URL and returns its identifier.
pub fn find_identifier(text: &str) -> Option<String> {
    ARCHIVE_ITEM_URL
        .captures(text)
        .map(|captures| captures[1].to_string())
}
