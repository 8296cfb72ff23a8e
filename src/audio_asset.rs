//! Audio-asset selection over decoded Archive.org item metadata.

use serde_json::Value;

const PREFERRED_EXTENSIONS: [&str; 3] = ["mp3", "ogg", "m4a"];

/// Picks the best audio file entry from item metadata.
///
/// Extension preference wins; a format-string scan is the fallback when no
/// file name matches a preferred extension.
pub fn pick_audio_file(metadata: &Value) -> Option<&Value> {
    let files = metadata.get("files").and_then(Value::as_array)?;
    for extension in PREFERRED_EXTENSIONS {
        let suffix = format!(".{extension}");
        for file in files {
            let name = file.get("name").and_then(Value::as_str).unwrap_or_default();
            if name.to_ascii_lowercase().ends_with(&suffix) {
                return Some(file);
            }
        }
    }
    files.iter().find(|file| {
        let format = file
            .get("format")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_ascii_lowercase();
        format.contains("audio") || format.starts_with("mp3")
    })
}

pub fn file_name(file: &Value) -> Option<&str> {
    file.get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
}

pub fn file_format(file: &Value) -> Option<&str> {
    file.get("format").and_then(Value::as_str)
}

/// Declared byte size of a file entry, from `size` or `bytes`.
///
/// Empty strings and zero numbers are treated as undeclared. A zero-valued
/// numeric string is kept; callers detect it with [`size_is_zero`].
pub fn declared_size(file: &Value) -> Option<Value> {
    ["size", "bytes"].into_iter().find_map(|key| match file.get(key) {
        Some(Value::String(text)) if !text.trim().is_empty() => {
            Some(Value::String(text.trim().to_string()))
        }
        Some(Value::Number(number)) if number.as_f64() != Some(0.0) => {
            Some(Value::Number(number.clone()))
        }
        _ => None,
    })
}

pub fn size_is_zero(value: &Value) -> bool {
    match value {
        Value::Number(number) => number.as_f64().map(|size| size == 0.0).unwrap_or(false),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map(|size| size == 0.0)
            .unwrap_or(false),
        _ => true,
    }
}

/// Raw duration of a file entry, from `length` or `duration`.
pub fn file_duration(file: &Value) -> Option<String> {
    ["length", "duration"]
        .into_iter()
        .find_map(|key| match file.get(key) {
            Some(Value::String(text)) if !text.trim().is_empty() => {
                Some(text.trim().to_string())
            }
            Some(Value::Number(number)) if number.as_f64() != Some(0.0) => {
                Some(number.to_string())
            }
            _ => None,
        })
}

/// Formats a duration in seconds as `HH:MM:SS`, dropping the hour field when
/// zero. Non-numeric input passes through unchanged.
pub fn format_duration(raw: &str) -> String {
    let Ok(total) = raw.trim().parse::<f64>() else {
        return raw.to_string();
    };
    let total_seconds = total as i64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

pub fn mime_type(file_name: &str, declared_format: &str) -> String {
    if file_name.to_ascii_lowercase().ends_with(".mp3") {
        "audio/mpeg".to_string()
    } else {
        declared_format.to_string()
    }
}
