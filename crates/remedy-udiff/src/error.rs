//! Error types for diff application.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while parsing or applying a patch.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The diff text contains no `--- a/<path>` file header
    #[error("diff has no `--- a/<path>` file header")]
    MissingFileHeader,

    /// The diff names a target outside the module folder being patched
    #[error("diff target `{0}` escapes the module folder")]
    TargetOutsideModule(PathBuf),

    /// Reading or writing the target file failed
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A context line in the hunk does not match the file's current content.
    /// The file is left untouched when this is raised.
    #[error("file {file} does not match patch: expected {expected:?}, found {actual:?}")]
    ContextMismatch {
        file: PathBuf,
        expected: String,
        actual: String,
    },
}

/// Result type for patch operations.
pub type Result<T> = std::result::Result<T, PatchError>;
