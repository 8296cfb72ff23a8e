//! Blocking Archive.org metadata API client with retry and backoff.

use std::time::Duration;

use log::{error, warn};
use serde_json::Value;

const API_BASE_URL: &str = "https://archive.org/metadata";
const DOWNLOAD_BASE_URL: &str = "https://archive.org/download";
const USER_AGENT: &str = concat!("castmeta/", env!("CARGO_PKG_VERSION"));

/// Archive.org metadata API client backed by `ureq`.
pub struct ArchiveClient {
    http_client: ureq::Agent,
    retries: u32,
}

impl ArchiveClient {
    pub fn new(timeout_secs: u64, retries: u32) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout(Duration::from_secs(timeout_secs))
            .build();
        Self {
            http_client,
            retries,
        }
    }

    /// Fetches and decodes item metadata for an identifier, or `None` once
    /// the retry budget is exhausted.
    pub fn fetch_metadata(&self, identifier: &str) -> Option<Value> {
        let url = format!("{API_BASE_URL}/{}", urlencoding::encode(identifier));
        let describe = format!("metadata fetch for {identifier}");
        retry_with_backoff(self.retries, &describe, || {
            let response = self
                .http_client
                .get(&url)
                .set("User-Agent", USER_AGENT)
                .set("Accept", "application/json")
                .call()
                .map_err(|err| format!("request failed: {err}"))?;
            response
                .into_json::<Value>()
                .map_err(|err| format!("invalid JSON response: {err}"))
        })
    }

    /// Issues a HEAD request and returns the `Content-Length` header value.
    ///
    /// A response without the header counts as a successful call that
    /// resolved no size; only transport failures are retried.
    pub fn head_content_length(&self, url: &str) -> Option<String> {
        let describe = format!("HEAD request for {url}");
        retry_with_backoff(self.retries, &describe, || {
            let response = self
                .http_client
                .head(url)
                .set("User-Agent", USER_AGENT)
                .call()
                .map_err(|err| format!("request failed: {err}"))?;
            Ok(response.header("Content-Length").map(str::to_string))
        })
        .flatten()
    }
}

pub fn download_url(identifier: &str, file_name: &str) -> String {
    format!(
        "{DOWNLOAD_BASE_URL}/{identifier}/{}",
        urlencoding::encode(file_name)
    )
}

/// Runs `operation` up to `retries + 1` times, sleeping `1.5^attempt` seconds
/// between attempts. Returns `None` when the budget is exhausted.
pub fn retry_with_backoff<T>(
    retries: u32,
    describe: &str,
    mut operation: impl FnMut() -> Result<T, String>,
) -> Option<T> {
    let mut attempt = 0;
    loop {
        match operation() {
            Ok(value) => return Some(value),
            Err(err) => {
                attempt += 1;
                if attempt > retries {
                    error!("{describe} failed: {err}");
                    return None;
                }
                let sleep_secs = 1.5_f64.powi(attempt as i32);
                warn!("Retry {attempt}/{retries} for {describe} after {sleep_secs:.1}s");
                std::thread::sleep(Duration::from_secs_f64(sleep_secs));
            }
        }
    }
}
