// src/error.rs

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// Pipeline stage an error belongs to, used when reporting a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Fetch,
    Extract,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Config => "config",
            Stage::Fetch => "fetch",
            Stage::Extract => "extract",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport failure or non-success HTTP status.
    #[error("network error fetching {url}: {reason}")]
    Network {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// The registry host refused or dropped the connection.
    #[error("cannot connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("source not found: {0}")]
    NotFound(String),

    /// `incomplete` marks pages the registry cut short under load.
    #[error("parse error in {source_ref}: {reason}")]
    Parse {
        source_ref: String,
        reason: String,
        incomplete: bool,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        stage: Stage,
        #[source]
        source: io::Error,
    },
}

pub type Result<T, E = ExtractError> = std::result::Result<T, E>;

impl ExtractError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    pub fn parse(source_ref: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::Parse {
            source_ref: source_ref.to_string(),
            reason: reason.into(),
            incomplete: false,
        }
    }

    /// A page missing parts the registry drops when overloaded; fetched again.
    pub fn incomplete_page(source_ref: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::Parse {
            source_ref: source_ref.to_string(),
            reason: reason.into(),
            incomplete: true,
        }
    }

    pub fn write_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            stage: Stage::Write,
            source,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::Config(_) => Stage::Config,
            Self::Network { .. } | Self::Connect { .. } | Self::NotFound(_) => Stage::Fetch,
            Self::Parse { .. } => Stage::Extract,
            Self::Io { stage, .. } => *stage,
        }
    }

    /// HTTP status carried by a network error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => *status,
            _ => None,
        }
    }

    /// True for a 404 response or a missing local source.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || self.status() == Some(404)
    }

    /// Timeouts, other transport failures, 5xx responses and incomplete pages.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { status: None, .. } => true,
            Self::Network {
                status: Some(code), ..
            } => *code >= 500,
            Self::Parse { incomplete, .. } => *incomplete,
            _ => false,
        }
    }
}
