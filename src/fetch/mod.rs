// src/fetch/mod.rs

use reqwest::blocking::Client;
use std::{thread, time::Duration};
use tracing::{error, instrument, warn};
use url::Url;

use crate::config::{ExtractionConfig, RetryPolicy};
use crate::error::{ExtractError, Result};

mod http;
mod local;

/// Fetched text of one source, not yet parsed.
#[derive(Debug, Clone)]
pub struct RawDocument {
    url: Url,
    body: String,
}

impl RawDocument {
    pub fn new(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            body: body.into(),
        }
    }

    /// Where the document came from; relative links resolve against it.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Retrieves registry pages over HTTP or from the local filesystem.
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cnes_beds/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExtractError::config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client, retry })
    }

    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        Self::new(config.request_timeout, config.retry)
    }

    /// Fetch `url`, retrying transient failures per the retry policy.
    pub fn fetch(&self, url: &Url) -> Result<RawDocument> {
        self.fetch_with(url, Ok)
    }

    /// Fetch `url` and hand it to `parse`. A retryable failure from either
    /// step costs one attempt; the page is requested again until the retry
    /// policy runs out.
    #[instrument(level = "debug", skip(self, url, parse), fields(url = %url))]
    pub fn fetch_with<T, F>(&self, url: &Url, mut parse: F) -> Result<T>
    where
        F: FnMut(RawDocument) -> Result<T>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let outcome = self
                .fetch_once(url)
                .and_then(|body| parse(RawDocument::new(url.clone(), body)));
            match outcome {
                Ok(parsed) => return Ok(parsed),
                Err(e) if e.is_retryable() && attempt < self.retry.attempts => {
                    warn!(
                        %url,
                        attempt,
                        delay_ms = self.retry.delay.as_millis() as u64,
                        error = %e,
                        "Retrying"
                    );
                    thread::sleep(self.retry.delay);
                }
                Err(e) => {
                    if e.is_retryable() {
                        error!(%url, attempts = attempt, error = %e, "Exhausted retries");
                    }
                    return Err(e);
                }
            }
        }
    }

    fn fetch_once(&self, url: &Url) -> Result<String> {
        match url.scheme() {
            "http" | "https" => http::get_text(&self.client, url),
            "file" => local::read_text(url),
            other => Err(ExtractError::config(format!(
                "unsupported scheme `{other}` in {url}"
            ))),
        }
    }
}
