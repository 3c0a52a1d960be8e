//! Apply a parsed patch to a file inside a module folder.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{PatchError, Result};
use crate::parser::{parse_patch, HunkOp};

/// What happened when a diff was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The target file was rewritten in place
    Applied {
        /// Absolute path of the patched file
        file: PathBuf,
    },
    /// The diff carried no hunk; nothing was read or written
    NothingToApply,
}

/// Apply one raw diff text to the module installed at `module_folder`.
///
/// The hunk is walked with a single line cursor over the file's current
/// line buffer: deletions remove the line at the cursor and leave the cursor
/// in place (the next line slides into the freed slot), insertions splice in
/// new text and advance, and context lines must match the buffer exactly
/// before the cursor advances past them. The first context disagreement
/// aborts with [`PatchError::ContextMismatch`] before anything is written,
/// leaving the file exactly as it was.
///
/// Files are split line-ending-agnostically and rewritten with the same
/// convention they were read with (CRLF in, CRLF out).
pub fn apply_patch(diff_text: &str, module_folder: &Path) -> Result<PatchOutcome> {
    let parsed = parse_patch(diff_text)?;

    if parsed.file.is_absolute()
        || parsed
            .file
            .components()
            .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(PatchError::TargetOutsideModule(parsed.file));
    }
    let target = module_folder.join(&parsed.file);

    let Some(hunk) = parsed.hunk else {
        debug!(file = %target.display(), "diff carries no hunk, nothing to apply");
        return Ok(PatchOutcome::NothingToApply);
    };
    if hunk.ops.is_empty() {
        debug!(file = %target.display(), "hunk has no operations, nothing to apply");
        return Ok(PatchOutcome::NothingToApply);
    }

    let contents = fs::read_to_string(&target).map_err(|source| PatchError::Io {
        path: target.clone(),
        source,
    })?;
    let uses_crlf = contents.contains("\r\n");
    let mut lines: Vec<String> = contents
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect();

    let mut cursor = hunk.start_line;
    for op in &hunk.ops {
        match op {
            HunkOp::Delete => {
                if cursor >= lines.len() {
                    return Err(PatchError::ContextMismatch {
                        file: target,
                        expected: "<a line to remove>".to_string(),
                        actual: "<end of file>".to_string(),
                    });
                }
                lines.remove(cursor);
                // No cursor advance: the next line now sits at this slot.
            }
            HunkOp::Insert(text) => {
                let at = cursor.min(lines.len());
                lines.insert(at, text.clone());
                cursor += 1;
            }
            HunkOp::Context(expected) => match lines.get(cursor) {
                Some(actual) if actual == expected => cursor += 1,
                other => {
                    let actual = other
                        .cloned()
                        .unwrap_or_else(|| "<end of file>".to_string());
                    return Err(PatchError::ContextMismatch {
                        file: target,
                        expected: expected.clone(),
                        actual,
                    });
                }
            },
        }
    }

    let eol = if uses_crlf { "\r\n" } else { "\n" };
    fs::write(&target, lines.join(eol)).map_err(|source| PatchError::Io {
        path: target.clone(),
        source,
    })?;

    debug!(file = %target.display(), "applied patch");
    Ok(PatchOutcome::Applied { file: target })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Write `contents` to `<module>/<relative>` and return the module root.
    fn module_with_file(relative: &str, contents: &str) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join(relative);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, contents).unwrap();
        (tmp, target)
    }

    #[test]
    fn test_replace_one_line() {
        let (module, target) =
            module_with_file("lib/sum.js", "function sum(a, b) {\n  return a + b;\n}\n");
        let diff = "\
--- a/lib/sum.js
+++ b/lib/sum.js
@@ -1,3 +1,3 @@
 function sum(a, b) {
-  return a + b;
+  return Number(a) + Number(b);
 }
";
        let outcome = apply_patch(diff, module.path()).unwrap();
        assert_eq!(outcome, PatchOutcome::Applied { file: target.clone() });
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "function sum(a, b) {\n  return Number(a) + Number(b);\n}\n"
        );
    }

    #[test]
    fn test_delete_one_line_insert_two() {
        let (module, target) = module_with_file("f.txt", "l1\nl2\nl3\nl4\nl5\n");
        let diff = "\
--- a/f.txt
+++ b/f.txt
@@ -4,2 +4,3 @@
 l4
-l5
+r5a
+r5b
";
        apply_patch(diff, module.path()).unwrap();
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "l1\nl2\nl3\nl4\nr5a\nr5b\n"
        );
    }

    #[test]
    fn test_context_mismatch_leaves_file_untouched() {
        let original = "function sum(a, b) {\n  return a - b;\n}\n";
        let (module, target) = module_with_file("lib/sum.js", original);
        let diff = "\
--- a/lib/sum.js
+++ b/lib/sum.js
@@ -1,3 +1,3 @@
 function sum(a, b) {
-  return a - b;
+  return a + b;
 THIS CONTEXT IS WRONG
";
        let err = apply_patch(diff, module.path()).unwrap_err();
        match err {
            PatchError::ContextMismatch { file, expected, actual } => {
                assert_eq!(file, target);
                assert_eq!(expected, "THIS CONTEXT IS WRONG");
                assert_eq!(actual, "}");
            }
            other => panic!("expected ContextMismatch, got {other:?}"),
        }
        assert_eq!(fs::read_to_string(&target).unwrap(), original);
    }

    #[test]
    fn test_context_past_end_of_file_is_a_mismatch() {
        let (module, target) = module_with_file("f.txt", "only");
        let diff = "\
--- a/f.txt
+++ b/f.txt
@@ -1,2 +1,2 @@
 only
 beyond the end
";
        let err = apply_patch(diff, module.path()).unwrap_err();
        assert!(matches!(err, PatchError::ContextMismatch { .. }));
        assert_eq!(fs::read_to_string(&target).unwrap(), "only");
    }

    #[test]
    fn test_inverse_diff_restores_original_bytes() {
        let original = "a\nb\nc\nd\ne\n";
        let (module, target) = module_with_file("f.txt", original);
        let forward = "\
--- a/f.txt
+++ b/f.txt
@@ -2,3 +2,3 @@
 b
-c
+C!
 d
";
        let inverse = "\
--- a/f.txt
+++ b/f.txt
@@ -2,3 +2,3 @@
 b
-C!
+c
 d
";
        apply_patch(forward, module.path()).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "a\nb\nC!\nd\ne\n");
        apply_patch(inverse, module.path()).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), original);
    }

    #[test]
    fn test_crlf_file_is_rewritten_with_crlf() {
        let (module, target) = module_with_file("f.txt", "one\r\ntwo\r\nthree\r\n");
        let diff = "\
--- a/f.txt
+++ b/f.txt
@@ -1,3 +1,3 @@
 one
-two
+TWO
 three
";
        apply_patch(diff, module.path()).unwrap();
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "one\r\nTWO\r\nthree\r\n"
        );
    }

    #[test]
    fn test_header_only_diff_is_a_noop() {
        let (module, target) = module_with_file("f.txt", "unchanged\n");
        let outcome = apply_patch("--- a/f.txt\n+++ b/f.txt\n", module.path()).unwrap();
        assert_eq!(outcome, PatchOutcome::NothingToApply);
        assert_eq!(fs::read_to_string(&target).unwrap(), "unchanged\n");
    }

    #[test]
    fn test_noop_does_not_require_target_to_exist() {
        let module = TempDir::new().unwrap();
        let outcome = apply_patch("--- a/missing.txt\n+++ b/missing.txt\n", module.path()).unwrap();
        assert_eq!(outcome, PatchOutcome::NothingToApply);
    }

    #[test]
    fn test_parent_dir_escape_is_rejected() {
        let module = TempDir::new().unwrap();
        let diff = "\
--- a/../outside.txt
+++ b/../outside.txt
@@ -1,1 +1,1 @@
-a
+b
";
        let err = apply_patch(diff, module.path()).unwrap_err();
        assert!(matches!(err, PatchError::TargetOutsideModule(_)));
    }

    #[test]
    fn test_missing_target_file_is_an_io_error() {
        let module = TempDir::new().unwrap();
        let diff = "\
--- a/gone.txt
+++ b/gone.txt
@@ -1,1 +1,1 @@
-a
+b
";
        let err = apply_patch(diff, module.path()).unwrap_err();
        assert!(matches!(err, PatchError::Io { .. }));
    }
}
