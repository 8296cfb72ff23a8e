//! Front-matter parsing, merge, and in-place post rewriting.

use std::collections::HashMap;
use std::path::Path;

use log::info;
use serde_json::Value;

const FRONT_MATTER_MARKER: &str = "---";

/// Backups live outside `_posts/` so the site generator never picks them up.
pub const BACKUP_DIR: &str = "scripts/backups";

enum HeaderEntry {
    /// A `key: value` header line, emitted from the value map on render.
    Field(String),
    /// A header line without a colon, preserved verbatim.
    Raw(String),
}

/// A parsed post: ordered header entries, a key/value map, and the untouched
/// body text after the second marker.
pub struct FrontMatter {
    values: HashMap<String, String>,
    order: Vec<HeaderEntry>,
    body: String,
}

impl FrontMatter {
    pub fn parse(content: &str) -> Result<Self, String> {
        if !content.starts_with(FRONT_MATTER_MARKER) {
            return Err("document does not start with a front-matter delimiter".to_string());
        }
        let segments: Vec<&str> = content.splitn(3, FRONT_MATTER_MARKER).collect();
        if segments.len() < 3 {
            return Err("front-matter block is not closed".to_string());
        }

        let mut values = HashMap::new();
        let mut order = Vec::new();
        for line in segments[1].trim().lines() {
            if let Some((key, value)) = line.split_once(':') {
                let key = key.trim().to_string();
                values.insert(key.clone(), value.trim().to_string());
                order.push(HeaderEntry::Field(key));
            } else {
                order.push(HeaderEntry::Raw(line.to_string()));
            }
        }

        Ok(Self {
            values,
            order,
            body: segments[2].to_string(),
        })
    }

    /// Overwrites existing keys in place and appends new keys to the order.
    pub fn merge(&mut self, updates: &[(String, Value)]) {
        for (key, value) in updates {
            if !self.values.contains_key(key) {
                self.order.push(HeaderEntry::Field(key.clone()));
            }
            self.values.insert(key.clone(), render_update_value(value));
        }
    }

    pub fn render(&self) -> String {
        let mut header_lines = Vec::new();
        for entry in &self.order {
            match entry {
                HeaderEntry::Raw(line) => header_lines.push(line.clone()),
                HeaderEntry::Field(key) => {
                    if let Some(value) = self.values.get(key) {
                        header_lines.push(format!("{key}: {value}"));
                    }
                }
            }
        }
        format!(
            "{FRONT_MATTER_MARKER}\n{}\n{FRONT_MATTER_MARKER}{}",
            header_lines.join("\n"),
            self.body
        )
    }
}

fn render_update_value(value: &Value) -> String {
    match value {
        Value::String(text) => {
            if text.contains(':') || text.starts_with("http") || text.contains(char::is_whitespace)
            {
                format!("\"{}\"", text.replace('"', "\\\""))
            } else {
                text.clone()
            }
        }
        other => other.to_string(),
    }
}

/// Merges `updates` into the post at `post_path` and rewrites it in place.
///
/// The file is left untouched on any failure and in dry-run mode.
pub fn apply_updates(
    post_path: &Path,
    updates: &[(String, Value)],
    dry_run: bool,
    backup: bool,
) -> Result<(), String> {
    let content = std::fs::read_to_string(post_path)
        .map_err(|err| format!("failed to read {}: {err}", post_path.display()))?;
    let mut front_matter = FrontMatter::parse(&content)
        .map_err(|err| format!("{err} in {}", post_path.display()))?;
    front_matter.merge(updates);
    let new_content = front_matter.render();

    if dry_run {
        info!(
            "Dry run: would update {} with {:?}",
            post_path.display(),
            updates
        );
        return Ok(());
    }

    if backup {
        write_backup(post_path)?;
    }

    std::fs::write(post_path, new_content)
        .map_err(|err| format!("failed to write {}: {err}", post_path.display()))
}

fn write_backup(post_path: &Path) -> Result<(), String> {
    let backup_dir = Path::new(BACKUP_DIR);
    std::fs::create_dir_all(backup_dir)
        .map_err(|err| format!("failed to create {}: {err}", backup_dir.display()))?;
    let file_name = post_path
        .file_name()
        .ok_or_else(|| format!("no file name in {}", post_path.display()))?;
    let mut backup_name = file_name.to_os_string();
    backup_name.push(".bak");
    let backup_path = backup_dir.join(backup_name);
    std::fs::copy(post_path, &backup_path)
        .map_err(|err| format!("failed to copy into {}: {err}", backup_path.display()))?;
    info!("Backup written to {}", backup_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use serde_json::json;

    use super::{apply_updates, FrontMatter};

    const POST: &str = "---\n\
        layout: post\n\
        # scheduling\n\
        title: \"Weekly Show: Episode 9\"\n\
        date: 2025-08-30\n\
        ---\n\
        \nShow notes with https://archive.org/details/foo-2025 inside.\n";

    fn temp_post(tag: &str, content: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("castmeta-{tag}-{}-{nanos}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("2025-08-30-radioshow.md");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_rejects_document_without_leading_delimiter() {
        assert!(FrontMatter::parse("title: no front matter\n").is_err());
    }

    #[test]
    fn test_parse_rejects_unclosed_front_matter() {
        assert!(FrontMatter::parse("---\ntitle: open ended\n").is_err());
    }

    #[test]
    fn test_render_preserves_key_order_and_raw_lines() {
        let mut front_matter = FrontMatter::parse(POST).unwrap();
        front_matter.merge(&[("audio_mime".to_string(), json!("audio/mpeg"))]);
        let rendered = front_matter.render();
        let header: Vec<&str> = rendered.lines().skip(1).take(5).collect();
        assert_eq!(
            header,
            vec![
                "layout: post",
                "# scheduling",
                "title: \"Weekly Show: Episode 9\"",
                "date: 2025-08-30",
                "audio_mime: audio/mpeg",
            ]
        );
    }

    #[test]
    fn test_merge_with_no_value_changes_keeps_body_byte_identical() {
        let front_matter = FrontMatter::parse(POST).unwrap();
        let rendered = front_matter.render();
        let body = POST.splitn(3, "---").nth(2).unwrap();
        assert!(rendered.ends_with(body));
    }

    #[test]
    fn test_merge_quotes_urls_and_values_with_colons() {
        let mut front_matter = FrontMatter::parse(POST).unwrap();
        front_matter.merge(&[
            (
                "audio_url".to_string(),
                json!("https://archive.org/download/foo-2025/show.mp3"),
            ),
            ("itunes_duration".to_string(), json!("01:05")),
            ("audio_length".to_string(), json!(1000)),
            ("audio_mime".to_string(), json!("audio/mpeg")),
        ]);
        let rendered = front_matter.render();
        assert!(rendered
            .contains("audio_url: \"https://archive.org/download/foo-2025/show.mp3\"\n"));
        assert!(rendered.contains("itunes_duration: \"01:05\"\n"));
        assert!(rendered.contains("audio_length: 1000\n"));
        assert!(rendered.contains("audio_mime: audio/mpeg\n"));
    }

    #[test]
    fn test_merge_escapes_embedded_quotes() {
        let mut front_matter = FrontMatter::parse(POST).unwrap();
        front_matter.merge(&[("note".to_string(), json!("a \"quoted\" value"))]);
        assert!(front_matter
            .render()
            .contains("note: \"a \\\"quoted\\\" value\""));
    }

    #[test]
    fn test_merge_overwrites_existing_key_in_place() {
        let mut front_matter = FrontMatter::parse(POST).unwrap();
        front_matter.merge(&[("date".to_string(), json!("2025-09-06"))]);
        let rendered = front_matter.render();
        let date_lines: Vec<&str> = rendered
            .lines()
            .filter(|line| line.starts_with("date:"))
            .collect();
        assert_eq!(date_lines, vec!["date: 2025-09-06"]);
    }

    #[test]
    fn test_apply_updates_fails_without_touching_malformed_post() {
        let post = temp_post("malformed", "no front matter here\n");
        let result = apply_updates(
            &post,
            &[("audio_mime".to_string(), json!("audio/mpeg"))],
            false,
            false,
        );
        assert!(result.is_err());
        assert_eq!(
            std::fs::read_to_string(&post).unwrap(),
            "no front matter here\n"
        );
    }

    #[test]
    fn test_apply_updates_rewrites_post() {
        let post = temp_post("rewrite", POST);
        apply_updates(
            &post,
            &[("audio_mime".to_string(), json!("audio/mpeg"))],
            false,
            false,
        )
        .unwrap();
        let rewritten = std::fs::read_to_string(&post).unwrap();
        assert!(rewritten.contains("audio_mime: audio/mpeg\n"));
        assert!(rewritten.contains("Show notes with"));
    }

    #[test]
    fn test_dry_run_never_writes() {
        let post = temp_post("dry-run", POST);
        apply_updates(
            &post,
            &[("audio_mime".to_string(), json!("audio/mpeg"))],
            true,
            true,
        )
        .unwrap();
        assert_eq!(std::fs::read_to_string(&post).unwrap(), POST);
    }
}
