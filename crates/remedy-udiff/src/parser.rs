//! Parse raw diff texts into a target path and hunk operations.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{PatchError, Result};

/// Matches the old-file marker that names the patch target, e.g.
/// `--- a/lib/internal/baseSum.js`. Anything before it (a `diff --git`
/// line, an `index ...` line) is preamble and is discarded.
static FILE_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^--- a/(.+)$").expect("invalid file header regex")
});

/// Matches a hunk header and captures its 1-based old-file start line,
/// e.g. `@@ -4,7 +4,8 @@`.
static HUNK_HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@@ -(\d+),").expect("invalid hunk header regex"));

/// One body operation of a hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HunkOp {
    /// Unchanged line that must match the file at the cursor before moving on
    Context(String),
    /// Remove the line at the cursor. The diff's own `-` text is not
    /// consulted; the surrounding context lines carry the integrity check.
    Delete,
    /// Insert this text at the cursor
    Insert(String),
}

/// An ordered block of operations anchored at a line offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// 0-based offset into the target file where the first operation applies
    pub start_line: usize,
    pub ops: Vec<HunkOp>,
}

/// A diff reduced to what the applier needs: which file, and what to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPatch {
    /// Target file path, relative to the module folder
    pub file: PathBuf,
    /// `None` for an empty or header-only diff: a valid no-op
    pub hunk: Option<Hunk>,
}

/// Parse one raw diff text.
///
/// Only the first hunk is used; any later hunks in the same diff are
/// ignored. Supporting them would mean re-walking the body per hunk while
/// carrying the net insert/delete delta forward — an extension point, not
/// something the current catalog's single-hunk patches need.
///
/// A diff with a file header but no hunk header (or nothing after it) is a
/// valid no-op and parses to a `ParsedPatch` without a hunk. A diff with no
/// file header at all is malformed.
pub fn parse_patch(diff_text: &str) -> Result<ParsedPatch> {
    let header = FILE_HEADER_REGEX
        .captures(diff_text)
        .ok_or(PatchError::MissingFileHeader)?;

    let file = PathBuf::from(header[1].trim_end_matches('\r'));
    let body_start = header
        .get(0)
        .map(|m| m.start())
        .unwrap_or(0);
    let lines: Vec<&str> = diff_text[body_start..]
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();

    // Line 0 is `--- a/...`, line 1 is `+++ b/...`, line 2 must be the hunk
    // header. If it is absent or unrecognizable there is nothing to apply.
    let start_line = match lines.get(2).and_then(|l| HUNK_HEADER_REGEX.captures(l)) {
        Some(caps) => match caps[1].parse::<usize>() {
            Ok(n) => n.saturating_sub(1),
            Err(_) => return Ok(ParsedPatch { file, hunk: None }),
        },
        None => return Ok(ParsedPatch { file, hunk: None }),
    };

    let mut ops = Vec::new();
    for line in lines.iter().skip(3) {
        match line.as_bytes().first() {
            Some(b'-') => ops.push(HunkOp::Delete),
            Some(b'+') => ops.push(HunkOp::Insert(line[1..].to_string())),
            Some(b' ') => ops.push(HunkOp::Context(line[1..].to_string())),
            // Any other leading character (or a blank line) ends the hunk.
            _ => break,
        }
    }

    Ok(ParsedPatch {
        file,
        hunk: Some(Hunk { start_line, ops }),
    })
}
