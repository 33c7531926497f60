//! Error types for html2notion library.

use std::io;
use thiserror::Error;

/// Result type alias for html2notion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting or uploading a page.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input bytes are not UTF-8 text.
    #[error("Invalid UTF-8 input: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// A request field is missing or malformed. No network call was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The API rejected the integration token.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The target page is not shared with the integration or does not exist.
    #[error("Permission denied: {0}")]
    Permission(String),

    /// The API reported rate limiting.
    #[error("Rate limited by the API{}", retry_hint(.retry_after))]
    RateLimit {
        /// Seconds to wait before retrying, if the API said so
        retry_after: Option<u64>,
    },

    /// The transport gave up waiting for a response.
    #[error("Request timed out")]
    Timeout,

    /// Any other error body returned by the API.
    #[error("API error {status} ({code}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// API error code, e.g. `validation_error`
        code: String,
        /// Human readable message from the API
        message: String,
    },

    /// The page was created but a later append of blocks failed.
    #[error("Page {page_id} was created but uploading its content failed: {source}")]
    PartialUpload {
        /// Id of the partially written page
        page_id: String,
        /// URL of the partially written page
        page_url: String,
        /// Number of blocks that were written before the failure
        blocks_written: usize,
        /// The failure that interrupted the upload
        #[source]
        source: Box<Error>,
    },

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP error.
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(" (retry after {}s)", secs),
        None => String::new(),
    }
}

impl Error {
    /// Check if this error happened after a page already exists.
    pub fn is_partial_upload(&self) -> bool {
        matches!(self, Error::PartialUpload { .. })
    }

    /// Check if the caller may reasonably retry the failed call.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RateLimit { .. } | Error::Timeout => true,
            Error::Api { status, .. } => *status >= 500,
            Error::PartialUpload { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Validation("parent id is required".into());
        assert_eq!(err.to_string(), "Validation error: parent id is required");

        let err = Error::RateLimit {
            retry_after: Some(3),
        };
        assert_eq!(err.to_string(), "Rate limited by the API (retry after 3s)");

        let err = Error::RateLimit { retry_after: None };
        assert_eq!(err.to_string(), "Rate limited by the API");
    }

    #[test]
    fn test_partial_upload_keeps_page() {
        let err = Error::PartialUpload {
            page_id: "abc".into(),
            page_url: "https://www.notion.so/abc".into(),
            blocks_written: 100,
            source: Box::new(Error::Timeout),
        };
        assert!(err.is_partial_upload());
        assert!(err.is_retryable());
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
