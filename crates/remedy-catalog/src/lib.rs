//! Patch catalog client for Remedy.
//!
//! The orchestrator needs to know, for each installed `(name, version)`
//! pair, which of the vulnerabilities named in the policy have source-level
//! patches available. That question is answered by an external vulnerability
//! database; this crate owns the boundary to it.
//!
//! - [`PatchSource`] is the injected capability: one lookup per package
//!   release. Retries, backoff, caching, and authentication all live behind
//!   this trait without affecting callers.
//! - [`fetch_patch_catalog`] is the core-side aggregation: it deduplicates
//!   identical `(name, version)` lookups (the same release often appears at
//!   many places in the tree), tolerates per-package failures, and folds the
//!   answers into one [`PatchCatalog`].
//! - [`HttpPatchSource`] is the production implementation over HTTP.

mod error;
mod http;

use async_trait::async_trait;
use tracing::{debug, warn};

use remedy_core::{PackageAndVersion, PatchCatalog, PatchDescriptor};

pub use error::{CatalogError, Result};
pub use http::HttpPatchSource;

/// A source of patches for vulnerable package releases.
#[async_trait]
pub trait PatchSource: Send + Sync {
    /// Return the patch descriptors available for `package`, restricted to
    /// the given vulnerability IDs. An empty Vec means the release is clean
    /// or carries only vulnerabilities nobody asked about.
    async fn patches_for(
        &self,
        package: &PackageAndVersion,
        vulnerability_ids: &[String],
    ) -> Result<Vec<PatchDescriptor>>;
}

/// Build the patch catalog for a set of installed packages.
///
/// Each distinct `(name, version)` pair is looked up exactly once. A failed
/// lookup skips that package with a warning and does not abort the run:
/// partial remediation beats none. An empty catalog is the normal "nothing
/// to patch" outcome.
pub async fn fetch_patch_catalog(
    source: &dyn PatchSource,
    installed: &[PackageAndVersion],
    vulnerability_ids: &[String],
) -> PatchCatalog {
    let mut catalog = PatchCatalog::default();
    let mut checked: Vec<&PackageAndVersion> = Vec::new();

    for package in installed {
        if checked.contains(&package) {
            continue;
        }
        checked.push(package);

        match source.patches_for(package, vulnerability_ids).await {
            Ok(descriptors) => {
                debug!(package = %package, patches = descriptors.len(), "catalog lookup done");
                catalog.extend_package(&package.name, descriptors);
            }
            Err(e) => {
                warn!(package = %package, error = %e, "catalog lookup failed, skipping package");
            }
        }
    }

    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted source that records every lookup it receives.
    struct ScriptedSource {
        calls: Mutex<Vec<PackageAndVersion>>,
        fail_for: Option<String>,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_for: None,
            }
        }

        fn failing_for(name: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_for: Some(name.to_string()),
            }
        }
    }

    #[async_trait]
    impl PatchSource for ScriptedSource {
        async fn patches_for(
            &self,
            package: &PackageAndVersion,
            _vulnerability_ids: &[String],
        ) -> Result<Vec<PatchDescriptor>> {
            self.calls.lock().unwrap().push(package.clone());
            if self.fail_for.as_deref() == Some(package.name.as_str()) {
                return Err(CatalogError::Status {
                    status: 500,
                    url: format!("mock://{package}"),
                });
            }
            Ok(vec![PatchDescriptor {
                id: format!("patch:{}:0", package.name),
                diffs: vec![],
            }])
        }
    }

    fn pv(name: &str, version: &str) -> PackageAndVersion {
        PackageAndVersion {
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_pairs_are_looked_up_once() {
        let source = ScriptedSource::new();
        let installed = vec![
            pv("lodash", "4.17.10"),
            pv("lodash", "4.17.10"),
            pv("lodash", "4.17.4"),
        ];
        let ids = vec!["VULN-1".to_string()];

        fetch_patch_catalog(&source, &installed, &ids).await;

        let calls = source.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], pv("lodash", "4.17.10"));
        assert_eq!(calls[1], pv("lodash", "4.17.4"));
    }

    #[tokio::test]
    async fn test_failed_lookup_skips_only_that_package() {
        let source = ScriptedSource::failing_for("bad-pkg");
        let installed = vec![pv("bad-pkg", "1.0.0"), pv("lodash", "4.17.10")];
        let ids = vec!["VULN-1".to_string()];

        let catalog = fetch_patch_catalog(&source, &installed, &ids).await;

        assert!(catalog.get("bad-pkg").is_none());
        assert!(catalog.get("lodash").is_some());
    }

    #[tokio::test]
    async fn test_no_installed_packages_yields_empty_catalog() {
        let source = ScriptedSource::new();
        let catalog = fetch_patch_catalog(&source, &[], &[]).await;
        assert!(catalog.is_empty());
    }
}
