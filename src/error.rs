use std::io;

use thiserror::Error;

/// Failures that abort a stage: bad configuration or broken local storage.
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid offer id pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },
    #[error("configuration error: {0}")]
    Config(String),
}

/// A single URL that produced no document. Logged and skipped, never fatal.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("failed to fetch {url}, status code: {status}")]
    Status { url: String, status: u16 },
    #[error("error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchFailure {
    pub fn url(&self) -> &str {
        match self {
            FetchFailure::Status { url, .. } | FetchFailure::Transport { url, .. } => url,
        }
    }
}
