//! Viewer inputs: the entry query parameter, URL entry and keyboard navigation

use std::collections::HashMap;

use super::error::{ViewerError, ViewerResult};

/// Query parameter carrying the PDF to open on page load
pub const ENTRY_PARAM: &str = "pdf";

/// How the viewer starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerEntry {
    /// A PDF URL was given; load it immediately
    AutoLoad(String),
    /// No URL; show the input control
    ManualEntry,
}

impl ViewerEntry {
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        match query.get(ENTRY_PARAM).map(|url| url.trim()) {
            Some(url) if !url.is_empty() => ViewerEntry::AutoLoad(url.to_string()),
            _ => ViewerEntry::ManualEntry,
        }
    }
}

/// Keys bound to navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKey {
    Previous,
    Next,
}

impl NavigationKey {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(NavigationKey::Previous),
            "ArrowRight" => Some(NavigationKey::Next),
            _ => None,
        }
    }
}

/// Trim and parse a user-supplied PDF URL; only http(s) is accepted
pub fn validate_url(raw: &str) -> ViewerResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ViewerError::MissingUrl);
    }
    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| ViewerError::InvalidUrl(format!("{}: {}", trimmed, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed.to_string()),
        other => Err(ViewerError::InvalidUrl(format!("unsupported scheme {}", other))),
    }
}
