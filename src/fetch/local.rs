// src/fetch/local.rs

use std::{fs, io};
use tracing::debug;
use url::Url;

use crate::error::{ExtractError, Result, Stage};

pub(super) fn read_text(url: &Url) -> Result<String> {
    let path = url
        .to_file_path()
        .map_err(|_| ExtractError::NotFound(format!("{url} (not a local path)")))?;
    debug!(path = %path.display(), "Reading local source");

    match fs::read(&path) {
        Ok(bytes) => Ok(decode(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ExtractError::NotFound(path.display().to_string()))
        }
        Err(e) => Err(ExtractError::Io {
            path,
            stage: Stage::Fetch,
            source: e,
        }),
    }
}

/// UTF-8 when valid, Latin-1 otherwise.
fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    }
}
