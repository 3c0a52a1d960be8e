//! Error types for catalog lookups.

use thiserror::Error;

/// Errors raised by a patch source.
///
/// All of these are recoverable per package: the orchestrator logs a warning
/// and moves on to the next package rather than aborting the run.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport-level failure talking to the vulnerability database
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The vulnerability database answered with a non-success status
    #[error("vulnerability database returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// The response body did not have the expected shape
    #[error("malformed catalog response: {0}")]
    MalformedResponse(String),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
