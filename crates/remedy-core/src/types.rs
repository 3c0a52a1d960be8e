//! Core types shared across the Remedy workspace.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One concrete installed copy of a package on disk.
///
/// The same package name may appear many times in a dependency tree
/// (duplicate or privately nested installs); each physical copy gets its own
/// record. Identity is the full triple, not just the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalModule {
    /// Declared package name from the manifest
    pub name: String,
    /// Declared version from the manifest
    pub version: String,
    /// Absolute path of the installed package folder
    pub folder_path: PathBuf,
}

/// A `(name, version)` pair identifying a package release.
///
/// Used as the lookup key for catalog queries: distinct physical copies of
/// the same release collapse to one of these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageAndVersion {
    pub name: String,
    pub version: String,
}

impl From<&PhysicalModule> for PackageAndVersion {
    fn from(module: &PhysicalModule) -> Self {
        Self {
            name: module.name.clone(),
            version: module.version.clone(),
        }
    }
}

impl std::fmt::Display for PackageAndVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// One fix for one vulnerability in one package.
///
/// A descriptor may bundle several raw diff texts, e.g. when a fix touches
/// more than one file within the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchDescriptor {
    /// Patch identifier assigned by the vulnerability database
    pub id: String,
    /// Raw unified-diff texts, in application order
    pub diffs: Vec<String>,
}

/// Ordered mapping from package name to the patches available for it.
///
/// Produced by the catalog client, consumed once by the orchestrator. An
/// empty catalog is the normal "nothing to patch" outcome, not an error.
#[derive(Debug, Clone, Default)]
pub struct PatchCatalog {
    entries: Vec<(String, Vec<PatchDescriptor>)>,
}

impl PatchCatalog {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Append descriptors for a package, merging with an existing entry for
    /// the same name rather than creating a duplicate key.
    pub fn extend_package(&mut self, name: &str, descriptors: Vec<PatchDescriptor>) {
        if descriptors.is_empty() {
            return;
        }
        if let Some((_, existing)) = self.entries.iter_mut().find(|(n, _)| n == name) {
            existing.extend(descriptors);
        } else {
            self.entries.push((name.to_string(), descriptors));
        }
    }

    pub fn get(&self, name: &str) -> Option<&[PatchDescriptor]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PatchDescriptor])> {
        self.entries
            .iter()
            .map(|(n, d)| (n.as_str(), d.as_slice()))
    }
}
