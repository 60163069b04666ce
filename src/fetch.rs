//! Outbound HTTP fetching for the catalog listing, detail pages and media.

use futures_util::StreamExt;
use reqwest::header;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::error::Error;
use crate::TARGET_WEB_REQUEST;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A fetched text resource (catalog listing or detail page body).
#[derive(Debug, Clone)]
pub struct TextResponse {
    pub ok: bool,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// Outbound content fetcher.
///
/// Non-2xx responses and content-type mismatches are resolution failures for
/// the caller, not errors; `Err` is reserved for transport, timeout and
/// local-file problems.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch_text(&self, url: &str) -> Result<TextResponse, Error>;

    /// Download `url` to `dest` if the response succeeds and its content-type
    /// starts with `expected_type`. Returns `Ok(false)` without touching
    /// `dest` otherwise. The body is streamed to the file and flushed before
    /// returning, so a `true` result always refers to a fully written file.
    async fn fetch_to_file(
        &self,
        url: &str,
        dest: &Path,
        expected_type: &str,
    ) -> Result<bool, Error>;
}

/// `reqwest`-backed fetcher with a bounded per-request timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::default())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, Error> {
        debug!(target: TARGET_WEB_REQUEST, "Requesting {}", url);
        match timeout(REQUEST_TIMEOUT, self.client.get(url).send()).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(Error::Fetch {
                url: url.to_string(),
                reason: err.to_string(),
            }),
            Err(_) => Err(Error::Fetch {
                url: url.to_string(),
                reason: format!("timed out after {}s", REQUEST_TIMEOUT.as_secs()),
            }),
        }
    }
}

fn content_type(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<TextResponse, Error> {
        let response = self.get(url).await?;
        let status = response.status();
        let content_type = content_type(&response);
        let body = response.text().await.map_err(|err| Error::Fetch {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        debug!(target: TARGET_WEB_REQUEST, "Request to {} returned status {}", url, status);
        Ok(TextResponse {
            ok: status.is_success(),
            status: status.as_u16(),
            content_type,
            body,
        })
    }

    async fn fetch_to_file(
        &self,
        url: &str,
        dest: &Path,
        expected_type: &str,
    ) -> Result<bool, Error> {
        let response = self.get(url).await?;
        if !response.status().is_success() {
            debug!(target: TARGET_WEB_REQUEST, "Status {} from {}", response.status(), url);
            return Ok(false);
        }
        let matches = content_type(&response)
            .map_or(false, |value| value.starts_with(expected_type));
        if !matches {
            debug!(target: TARGET_WEB_REQUEST, "Unexpected content-type from {}", url);
            return Ok(false);
        }

        let mut file = File::create(dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| Error::Fetch {
                url: url.to_string(),
                reason: err.to_string(),
            })?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(true)
    }
}
