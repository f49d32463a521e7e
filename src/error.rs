//! Error types for fetching, paginating and exporting

use reqwest::StatusCode;
use thiserror::Error;

/// Broad classification of a non-success HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Unauthorized,
    NotFound,
    RateLimited,
    Server,
    Other,
}

impl StatusKind {
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => StatusKind::Unauthorized,
            404 => StatusKind::NotFound,
            429 => StatusKind::RateLimited,
            500..=599 => StatusKind::Server,
            _ => StatusKind::Other,
        }
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusKind::Unauthorized => write!(f, "unauthorized"),
            StatusKind::NotFound => write!(f, "not found"),
            StatusKind::RateLimited => write!(f, "rate limited"),
            StatusKind::Server => write!(f, "server error"),
            StatusKind::Other => write!(f, "unexpected status"),
        }
    }
}

/// Failure of a single page read
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed with {status} ({kind}): {body}")]
    Status {
        url: String,
        status: StatusCode,
        kind: StatusKind,
        body: String,
    },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid request headers: {0}")]
    InvalidHeader(String),
}

impl FetchError {
    /// Status failures end a page sequence; everything else aborts it
    pub fn is_status(&self) -> bool {
        matches!(self, FetchError::Status { .. })
    }
}

/// Failure while walking a paginated resource
#[derive(Error, Debug)]
pub enum RetrieveError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("malformed page {page}: {reason}")]
    MalformedPage { page: String, reason: String },

    #[error("failed to decode item on page {page}: {source}")]
    Item {
        page: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure while exporting tables to disk
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Retrieve(#[from] RetrieveError),

    #[error("table with ID {0} not found")]
    TableNotFound(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<FetchError> for ExportError {
    fn from(err: FetchError) -> Self {
        ExportError::Retrieve(RetrieveError::Fetch(err))
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
