//! Unified-diff parsing and in-place application for Remedy.
//!
//! This crate takes the raw diff texts served by the patch catalog and
//! applies them to files inside an installed package folder. The diffs are
//! narrow, machine-generated fixes: one target file, one hunk, a handful of
//! context lines. The applier walks the hunk with an explicit line cursor and
//! refuses to write anything if a context line disagrees with the file on
//! disk, since a misaligned offset would silently corrupt the target.
//!
//! # Architecture
//!
//! - `parser` turns a raw diff text into a target path plus an ordered hunk
//! - `applier` mutates the target file's line buffer and persists it
//! - Depends on: regex, thiserror (no async, no network)
//! - Used by: remedy (orchestrator)

mod applier;
mod error;
mod parser;

pub use applier::{apply_patch, PatchOutcome};
pub use error::{PatchError, Result};
pub use parser::{parse_patch, Hunk, HunkOp, ParsedPatch};
