//! Per-post processing pipeline: resolve identifier, fetch metadata, pick an
//! audio asset, and rewrite the post's front matter.

use std::path::Path;

use log::{error, info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::archive_client::{self, ArchiveClient};
use crate::audio_asset;
use crate::front_matter;
use crate::post_identifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    #[serde(rename = "no-identifier")]
    NoIdentifier,
    #[serde(rename = "metadata-fetch-failed")]
    MetadataFetchFailed,
    #[serde(rename = "no-audio-file")]
    NoAudioFile,
    #[serde(rename = "no-file-name")]
    NoFileName,
    #[serde(rename = "update-failed")]
    UpdateFailed,
}

/// Front-matter fields derived from a selected audio asset.
#[derive(Debug, Clone, Serialize)]
pub struct AudioUpdates {
    pub audio_url: String,
    pub audio_length: Value,
    pub audio_mime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itunes_duration: Option<String>,
}

impl AudioUpdates {
    pub fn as_field_updates(&self) -> Vec<(String, Value)> {
        let mut fields = vec![
            (
                "audio_url".to_string(),
                Value::String(self.audio_url.clone()),
            ),
            ("audio_length".to_string(), self.audio_length.clone()),
            (
                "audio_mime".to_string(),
                Value::String(self.audio_mime.clone()),
            ),
        ];
        if let Some(duration) = &self.itunes_duration {
            fields.push((
                "itunes_duration".to_string(),
                Value::String(duration.clone()),
            ));
        }
        fields
    }
}

/// Per-post outcome, one entry of the batch report.
#[derive(Debug, Serialize)]
pub struct PostOutcome {
    pub post: String,
    pub identifier: Option<String>,
    pub success: bool,
    pub reason: Option<FailureReason>,
    pub updates: Option<AudioUpdates>,
}

impl PostOutcome {
    fn failed(post: String, identifier: Option<String>, reason: FailureReason) -> Self {
        Self {
            post,
            identifier,
            success: false,
            reason: Some(reason),
            updates: None,
        }
    }

    fn succeeded(post: String, identifier: String, updates: AudioUpdates) -> Self {
        Self {
            post,
            identifier: Some(identifier),
            success: true,
            reason: None,
            updates: Some(updates),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub identifier_override: Option<String>,
    pub dry_run: bool,
    pub backup: bool,
    pub head_fallback: bool,
}

/// Processes one post end to end. Never panics or aborts the batch; every
/// failure path yields a `PostOutcome` with a reason.
pub fn process_post(
    post_path: &Path,
    options: &PipelineOptions,
    client: &ArchiveClient,
) -> PostOutcome {
    let post = post_path.display().to_string();

    let text = match std::fs::read_to_string(post_path) {
        Ok(text) => text,
        Err(err) => {
            error!("Failed to read {post}: {err}");
            return PostOutcome::failed(post, None, FailureReason::NoIdentifier);
        }
    };

    let identifier = options
        .identifier_override
        .clone()
        .or_else(|| post_identifier::find_identifier(&text));
    let Some(identifier) = identifier else {
        warn!("No Archive.org identifier found for {post}");
        return PostOutcome::failed(post, None, FailureReason::NoIdentifier);
    };
    info!("Using identifier {identifier} for {post}");

    let Some(metadata) = client.fetch_metadata(&identifier) else {
        return PostOutcome::failed(post, Some(identifier), FailureReason::MetadataFetchFailed);
    };

    let Some(audio_file) = audio_asset::pick_audio_file(&metadata) else {
        warn!("No audio file found in Archive.org item {identifier}");
        return PostOutcome::failed(post, Some(identifier), FailureReason::NoAudioFile);
    };

    let updates = match derive_updates(&identifier, audio_file, |audio_url| {
        if options.head_fallback {
            client.head_content_length(audio_url)
        } else {
            None
        }
    }) {
        Ok(updates) => updates,
        Err(reason) => {
            warn!("No file name present for the audio file in {identifier}");
            return PostOutcome::failed(post, Some(identifier), reason);
        }
    };

    if let Err(err) = front_matter::apply_updates(
        post_path,
        &updates.as_field_updates(),
        options.dry_run,
        options.backup,
    ) {
        error!("Failed to update {post}: {err}");
        return PostOutcome::failed(post, Some(identifier), FailureReason::UpdateFailed);
    }

    PostOutcome::succeeded(post, identifier, updates)
}

/// Builds the update set for one audio file entry.
///
/// `resolve_missing_size` is consulted with the download URL only when the
/// declared size is absent or zero.
fn derive_updates(
    identifier: &str,
    audio_file: &Value,
    resolve_missing_size: impl FnOnce(&str) -> Option<String>,
) -> Result<AudioUpdates, FailureReason> {
    let Some(file_name) = audio_asset::file_name(audio_file) else {
        return Err(FailureReason::NoFileName);
    };
    let audio_url = archive_client::download_url(identifier, file_name);

    let mut audio_length = audio_asset::declared_size(audio_file);
    if audio_length
        .as_ref()
        .map_or(true, audio_asset::size_is_zero)
    {
        if let Some(content_length) = resolve_missing_size(&audio_url) {
            audio_length = Some(Value::String(content_length));
        }
    }

    let audio_mime = audio_asset::mime_type(
        file_name,
        audio_asset::file_format(audio_file).unwrap_or_default(),
    );
    let itunes_duration =
        audio_asset::file_duration(audio_file).map(|raw| audio_asset::format_duration(&raw));

    Ok(AudioUpdates {
        audio_url,
        audio_length: audio_length.unwrap_or_else(|| Value::from(0)),
        audio_mime,
        itunes_duration,
    })
}
