//! Top-level error type for a remediation run.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors that abort a remediation run before any mutation.
///
/// Everything recoverable (a failed catalog lookup, a patch that no longer
/// matches one file) is handled inside the run and reported through the
/// summary instead.
#[derive(Debug, Error)]
pub enum RemedyError {
    /// The policy document could not be parsed
    #[error(transparent)]
    Policy(#[from] remedy_policy::PolicyError),

    /// The policy file could not be read at all
    #[error("failed to read policy file {path}: {source}")]
    PolicyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for remediation runs.
pub type Result<T> = std::result::Result<T, RemedyError>;
