//! Viewer error types
//!
//! Every failure below the orchestrator is expressed as a [`ViewerError`].
//! The orchestrator is the only place that turns one into user-facing text
//! (see [`ViewerError::user_message`]).

use thiserror::Error;

/// Transport-level failure while retrieving PDF bytes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No response within the configured timeout
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Upstream answered with a non-2xx status
    #[error("HTTP {0}")]
    Status(u16),

    /// Connection refused, DNS failure, reset, blocked by the relay...
    #[error("network error: {0}")]
    Network(String),
}

/// Unified viewer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerError {
    /// The PDF could not be retrieved
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// The bytes are not a readable PDF
    #[error("Decode error: {0}")]
    Decode(String),

    /// The document is password protected
    #[error("Document is password protected")]
    Auth,

    /// Rasterizing a specific page failed (1-based index)
    #[error("Render error on page {page}: {reason}")]
    Render { page: usize, reason: String },

    /// The flip renderer refused to initialize
    #[error("Init error: {0}")]
    Init(String),

    /// Page lookup outside `[1, count]`
    #[error("Page {index} out of range (document has {count} pages)")]
    Index { index: usize, count: usize },

    /// No URL was supplied
    #[error("No PDF URL given")]
    MissingUrl,

    /// The supplied URL does not parse
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A newer load started before this one finished; its result was dropped
    #[error("Load superseded by a newer request")]
    Superseded,
}

/// Result type alias for viewer operations
pub type ViewerResult<T> = std::result::Result<T, ViewerError>;

impl ViewerError {
    /// Short machine-readable kind, used in API bodies and logs
    pub fn kind(&self) -> &'static str {
        match self {
            ViewerError::Fetch(_) => "fetch_error",
            ViewerError::Decode(_) => "decode_error",
            ViewerError::Auth => "auth_error",
            ViewerError::Render { .. } => "render_error",
            ViewerError::Init(_) => "init_error",
            ViewerError::Index { .. } => "index_error",
            ViewerError::MissingUrl | ViewerError::InvalidUrl(_) => "invalid_request",
            ViewerError::Superseded => "superseded",
        }
    }

    /// Message shown to the person using the viewer
    pub fn user_message(&self) -> String {
        match self {
            ViewerError::Auth => "This PDF is password protected".to_string(),
            ViewerError::Decode(_) => "Invalid PDF file".to_string(),
            ViewerError::Fetch(FetchError::Status(404)) => {
                "PDF file not found (404 error)".to_string()
            }
            ViewerError::Fetch(FetchError::Status(code)) => {
                format!("Failed to load PDF: server responded with HTTP {}", code)
            }
            ViewerError::Fetch(FetchError::Timeout(secs)) => format!(
                "Network error: the PDF server did not respond within {} seconds",
                secs
            ),
            ViewerError::Fetch(FetchError::Network(_)) => {
                "Network error: Unable to fetch PDF. Check the URL and try again.".to_string()
            }
            ViewerError::Render { page, .. } => {
                format!("Failed to load PDF: page {} could not be rendered", page)
            }
            ViewerError::Init(_) => "Failed to initialize flipbook. Please try again.".to_string(),
            // Never expected to reach a user; indicates a controller/renderer desync
            ViewerError::Index { .. } => "Failed to load PDF: internal navigation error".to_string(),
            ViewerError::MissingUrl => "Please enter a PDF URL".to_string(),
            ViewerError::InvalidUrl(_) => "Please enter a valid URL".to_string(),
            ViewerError::Superseded => "Loading was replaced by a newer request".to_string(),
        }
    }
}

impl From<mupdf::Error> for ViewerError {
    fn from(err: mupdf::Error) -> Self {
        ViewerError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            ViewerError::Fetch(FetchError::Status(404)).user_message(),
            "PDF file not found (404 error)"
        );
        assert_eq!(ViewerError::Auth.user_message(), "This PDF is password protected");
        assert_eq!(ViewerError::Decode("bad xref".into()).user_message(), "Invalid PDF file");
        assert!(ViewerError::Fetch(FetchError::Network("refused".into()))
            .user_message()
            .starts_with("Network error"));
        assert!(ViewerError::Render { page: 7, reason: "oom".into() }
            .user_message()
            .contains("page 7"));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(ViewerError::Fetch(FetchError::Timeout(30)).kind(), "fetch_error");
        assert_eq!(ViewerError::Index { index: 4, count: 3 }.kind(), "index_error");
        assert_eq!(ViewerError::MissingUrl.kind(), "invalid_request");
    }
}
