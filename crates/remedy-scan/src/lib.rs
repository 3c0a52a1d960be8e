//! Dependency-tree scanning for Remedy.
//!
//! Walks an installed `node_modules` tree and records every physical copy of
//! the packages we care about. Duplicate installs are the norm, not the
//! exception: the same package can be nested privately under several parents
//! at several versions, and each copy must be found and patched on its own.
//! The walk therefore never prunes a subtree just because its owner already
//! matched.
//!
//! The scanner is read-only and returns a plain `Vec` rather than filling a
//! caller-supplied collection.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use remedy_core::PhysicalModule;

/// The subset of `package.json` the scanner needs.
#[derive(Debug, Deserialize)]
struct PackageManifest {
    name: String,
    version: String,
}

/// Find every installed copy of the named packages under `root`.
///
/// `root` is the project folder; the walk starts at `root/node_modules` and
/// descends into every nested `node_modules` at any depth. Traversal order is
/// directory-entry order and callers must not rely on it. Folders whose
/// manifest is missing, symlinked, or unreadable are skipped silently: they
/// cannot be verified, so they cannot be patched.
pub fn scan_installed_modules(root: &Path, names_of_interest: &[String]) -> Vec<PhysicalModule> {
    let mut found = Vec::new();
    visit_container(&root.join("node_modules"), names_of_interest, &mut found);
    found
}

/// Visit one package-container directory (a `node_modules` folder or an
/// `@scope` folder inside one).
fn visit_container(container: &Path, names_of_interest: &[String], found: &mut Vec<PhysicalModule>) {
    // A symlinked container (pnpm-style layouts) can point back up the tree
    // and form a cycle, so it is not descended.
    match fs::symlink_metadata(container) {
        Ok(metadata) if !metadata.file_type().is_symlink() => {}
        // No such directory is normal: leaf packages have no node_modules.
        _ => return,
    }
    let entries = match fs::read_dir(container) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        // file_type() does not follow symlinks; linked folders are skipped
        // for the same reason linked manifests are.
        if file_type.is_symlink() || !file_type.is_dir() {
            continue;
        }
        let file_name = entry.file_name();
        let folder_name = file_name.to_string_lossy();
        if folder_name.starts_with('.') {
            continue;
        }
        if folder_name.starts_with('@') {
            // Scope folders hold package folders one level down.
            visit_container(&path, names_of_interest, found);
        } else {
            visit_package(&path, names_of_interest, found);
        }
    }
}

/// Visit one candidate package folder: record it if its manifest names a
/// package of interest, then descend into its own `node_modules`.
fn visit_package(folder: &Path, names_of_interest: &[String], found: &mut Vec<PhysicalModule>) {
    match read_manifest(folder) {
        Some(manifest) => {
            if names_of_interest.iter().any(|n| *n == manifest.name) {
                debug!(
                    name = %manifest.name,
                    version = %manifest.version,
                    path = %folder.display(),
                    "found physical module of interest"
                );
                found.push(PhysicalModule {
                    name: manifest.name,
                    version: manifest.version,
                    folder_path: folder.to_path_buf(),
                });
            }
        }
        None => {
            debug!(path = %folder.display(), "skipping folder without readable manifest");
        }
    }

    // Nested copies under an already-matched package still count.
    visit_container(&folder.join("node_modules"), names_of_interest, found);
}

fn read_manifest(folder: &Path) -> Option<PackageManifest> {
    let manifest_path = folder.join("package.json");
    // A symlinked manifest cannot be trusted as belonging to this folder.
    let metadata = fs::symlink_metadata(&manifest_path).ok()?;
    if metadata.file_type().is_symlink() {
        return None;
    }
    let contents = fs::read_to_string(&manifest_path).ok()?;
    serde_json::from_str(&contents).ok()
}
