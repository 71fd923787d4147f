// src/fetch/http.rs

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::error::{ExtractError, Result};

/// The registry serves Latin-1 pages, often without a charset header.
const FALLBACK_CHARSET: &str = "windows-1252";

pub(super) fn get_text(client: &Client, url: &Url) -> Result<String> {
    debug!("Fetching text from {}", url);
    let resp = client
        .get(url.clone())
        .send()
        .map_err(|e| transport_error(url, e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(ExtractError::Network {
            url: url.to_string(),
            status: Some(status.as_u16()),
            reason: format!("non-success status {status}"),
        });
    }

    resp.text_with_charset(FALLBACK_CHARSET)
        .map_err(|e| transport_error(url, e))
}

/// Timeouts stay retryable; a refused connection does not.
fn transport_error(url: &Url, e: reqwest::Error) -> ExtractError {
    if e.is_connect() && !e.is_timeout() {
        return ExtractError::Connect {
            url: url.to_string(),
            reason: e.to_string(),
        };
    }
    let reason = if e.is_timeout() {
        format!("timed out: {e}")
    } else {
        e.to_string()
    };
    ExtractError::Network {
        url: url.to_string(),
        status: e.status().map(|s| s.as_u16()),
        reason,
    }
}
