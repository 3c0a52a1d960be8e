//! Policy file parsing for Remedy.
//!
//! A project opts into patching through a YAML policy file (`.remedy`) whose
//! `patch:` section maps vulnerability IDs to the dependency paths that pull
//! in the affected package:
//!
//! ```yaml
//! version: v1
//! patch:
//!   REMEDY-JS-LODASH-567746:
//!     - tap > nyc > istanbul-lib-instrument > babel-types > lodash:
//!         patched: '2021-02-17T13:43:51.857Z'
//! ```
//!
//! Only the final segment of each `>`-delimited path matters here: that is
//! the package that actually carries the vulnerable code. Everything else
//! (the ancestry chain, the `patched:` timestamp) is metadata this crate
//! ignores. Parsing does no filesystem or network I/O.

use thiserror::Error;

/// Errors raised while parsing a policy document.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The document is not valid YAML or its `patch` section has the wrong shape
    #[error("malformed policy document: {0}")]
    Malformed(String),
}

/// Result type for policy parsing.
pub type Result<T> = std::result::Result<T, PolicyError>;

/// Parsed policy: which vulnerabilities are slated for patching, and which
/// package names each one implicates.
///
/// Entries preserve the document's encounter order. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchPolicy {
    entries: Vec<(String, Vec<String>)>,
}

impl PatchPolicy {
    /// True when the policy names no vulnerabilities at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vulnerability IDs in document order.
    pub fn vulnerability_ids(&self) -> Vec<String> {
        self.entries.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Union of all implicated package names, in encounter order.
    /// Duplicates are kept; callers that need a set can dedup.
    pub fn package_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(_, names)| names.iter().cloned())
            .collect()
    }

    /// Package names implicated by a single vulnerability ID.
    pub fn packages_for(&self, vulnerability_id: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(id, _)| id == vulnerability_id)
            .map(|(_, names)| names.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(id, names)| (id.as_str(), names.as_slice()))
    }
}

/// Parse a policy document into a [`PatchPolicy`].
///
/// An absent or null `patch:` section is a legitimate "no patches
/// configured" state and yields an empty policy, not an error.
pub fn parse_policy(text: &str) -> Result<PatchPolicy> {
    let doc: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| PolicyError::Malformed(e.to_string()))?;

    let mapping = match &doc {
        serde_yaml::Value::Null => return Ok(PatchPolicy::default()),
        serde_yaml::Value::Mapping(m) => m,
        _ => {
            return Err(PolicyError::Malformed(
                "policy document is not a mapping".to_string(),
            ))
        }
    };

    let patch_value = mapping
        .iter()
        .find(|(k, _)| k.as_str() == Some("patch"))
        .map(|(_, v)| v);
    let patch_section = match patch_value {
        None | Some(serde_yaml::Value::Null) => return Ok(PatchPolicy::default()),
        Some(serde_yaml::Value::Mapping(m)) => m,
        Some(_) => {
            return Err(PolicyError::Malformed(
                "`patch` section is not a mapping".to_string(),
            ))
        }
    };

    let mut entries = Vec::new();
    for (key, value) in patch_section {
        let vulnerability_id = key
            .as_str()
            .ok_or_else(|| {
                PolicyError::Malformed("vulnerability ID is not a string".to_string())
            })?
            .to_string();

        let mut names = Vec::new();
        match value {
            serde_yaml::Value::Null => {}
            serde_yaml::Value::Sequence(items) => {
                for item in items {
                    names.push(affected_package(item, &vulnerability_id)?);
                }
            }
            _ => {
                return Err(PolicyError::Malformed(format!(
                    "entries under `{vulnerability_id}` are not a list"
                )))
            }
        }

        tracing::debug!(
            vulnerability = %vulnerability_id,
            packages = names.len(),
            "parsed policy entry"
        );
        entries.push((vulnerability_id, names));
    }

    Ok(PatchPolicy { entries })
}

/// Extract the affected package name from one policy entry.
///
/// An entry is either a single-key mapping (`path: { patched: ... }`) or a
/// bare string path; either way the package name is the trimmed final
/// segment of the `>`-delimited dependency path.
fn affected_package(entry: &serde_yaml::Value, vulnerability_id: &str) -> Result<String> {
    let path = match entry {
        serde_yaml::Value::String(s) => s.as_str(),
        serde_yaml::Value::Mapping(m) => m
            .iter()
            .next()
            .and_then(|(k, _)| k.as_str())
            .ok_or_else(|| {
                PolicyError::Malformed(format!(
                    "entry under `{vulnerability_id}` has no dependency path key"
                ))
            })?,
        _ => {
            return Err(PolicyError::Malformed(format!(
                "entry under `{vulnerability_id}` is neither a mapping nor a string"
            )))
        }
    };

    let last = path.split('>').next_back().unwrap_or(path).trim();
    Ok(last.to_string())
}
