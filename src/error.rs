//! Error types for the console.
//!
//! Every failure a page can hit ends up in [`ConsoleError`], and every page
//! shows it the same way: as text in its error region. The device never
//! sends structured error codes, so a non-success status just carries the
//! response body along for display.

use reqwest::StatusCode;
use thiserror::Error;

/// Custom error type for console operations.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The device answered with a status other than the expected success.
    #[error("{body}")]
    Device { status: StatusCode, body: String },

    /// The request never completed (unreachable device, timeout, reset).
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// A JSON payload from the device could not be decoded.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The device used a literal-string signal outside the known set.
    #[error("Invalid response: {0}")]
    UnknownResponse(String),

    /// The configured device URL or a derived endpoint is malformed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ConsoleError {
    /// Error text in the `"{reason}, {body}"` form used by the setup pages.
    pub fn with_reason(&self) -> String {
        match self {
            Self::Device { status, body } => {
                format!("{}, {body}", status.canonical_reason().unwrap_or_default())
            }
            other => other.to_string(),
        }
    }
}
