//! Remedy - in-place patching of known-vulnerable installed packages.
//!
//! Given a project's policy file (which vulnerabilities are acknowledged and
//! slated for patching) and its installed dependency tree, Remedy finds
//! every physical copy of the implicated packages, asks the vulnerability
//! database for the matching source-level patches, and applies those diffs
//! to the installed files directly. No reinstall, no lockfile churn.
//!
//! The pieces live in their own crates (`remedy-policy`, `remedy-scan`,
//! `remedy-catalog`, `remedy-udiff`); this crate composes them and carries
//! the CLI.

pub mod error;
pub mod remediate;

pub use error::{RemedyError, Result};
pub use remediate::{remediate, remediate_project, RemediationSummary};
