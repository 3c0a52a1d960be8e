//! The orchestrator: policy -> scan -> catalog -> apply.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use remedy_catalog::{fetch_patch_catalog, PatchSource};
use remedy_core::{PackageAndVersion, PhysicalModule};
use remedy_policy::parse_policy;
use remedy_scan::scan_installed_modules;
use remedy_udiff::{apply_patch, PatchOutcome};

use crate::error::{RemedyError, Result};

/// What a remediation run accomplished.
#[derive(Debug, Clone, Default)]
pub struct RemediationSummary {
    /// Physical modules that had at least one catalog patch targeted at them
    pub modules_matched: usize,
    /// Files rewritten in place
    pub files_patched: usize,
    /// Per-module failures (catalog patches that no longer fit the files on
    /// disk). These do not fail the run; partial remediation is acceptable.
    pub failures: Vec<String>,
}

impl RemediationSummary {
    /// True when the run had no work to do: an empty policy, no matching
    /// installs, or a catalog with no patches. Distinct from failure.
    pub fn nothing_to_patch(&self) -> bool {
        self.modules_matched == 0 && self.failures.is_empty()
    }
}

/// Run remediation for a project given its policy document text.
///
/// Fatal only on a malformed policy, which aborts before any mutation; all
/// later trouble is scoped to one package or one file and recorded in the
/// summary.
pub async fn remediate(
    source: &dyn PatchSource,
    policy_text: &str,
    project_root: &Path,
) -> Result<RemediationSummary> {
    let policy = parse_policy(policy_text)?;
    let mut summary = RemediationSummary::default();

    if policy.is_empty() {
        info!("policy has no patch section; nothing to patch");
        return Ok(summary);
    }

    let vulnerability_ids = policy.vulnerability_ids();
    let names_of_interest = policy.package_names();

    let modules = scan_installed_modules(project_root, &names_of_interest);
    if modules.is_empty() {
        info!("no installed copies of the implicated packages; nothing to patch");
        return Ok(summary);
    }
    debug!(modules = modules.len(), "dependency tree scan complete");

    let installed: Vec<PackageAndVersion> =
        modules.iter().map(PackageAndVersion::from).collect();
    let catalog = fetch_patch_catalog(source, &installed, &vulnerability_ids).await;
    if catalog.is_empty() {
        info!("catalog returned no patches; nothing to patch");
        return Ok(summary);
    }

    for (package, descriptors) in catalog.iter() {
        for module in modules.iter().filter(|m| m.name == package) {
            summary.modules_matched += 1;
            patch_module(module, descriptors, &mut summary);
        }
    }

    info!(
        files_patched = summary.files_patched,
        modules_matched = summary.modules_matched,
        failures = summary.failures.len(),
        "remediation run complete"
    );
    Ok(summary)
}

/// Read the policy file and run remediation for the project.
pub async fn remediate_project(
    source: &dyn PatchSource,
    policy_path: &Path,
    project_root: &Path,
) -> Result<RemediationSummary> {
    let policy_text = fs::read_to_string(policy_path).map_err(|source| RemedyError::PolicyRead {
        path: policy_path.to_path_buf(),
        source,
    })?;
    remediate(source, &policy_text, project_root).await
}

/// Apply every diff of every descriptor to one physical module.
///
/// The first failure stops further diffs for this module: once one file has
/// refused a patch, later diffs in the same bundle can no longer be trusted
/// to land where they expect.
fn patch_module(
    module: &PhysicalModule,
    descriptors: &[remedy_core::PatchDescriptor],
    summary: &mut RemediationSummary,
) {
    for descriptor in descriptors {
        for diff in &descriptor.diffs {
            match apply_patch(diff, &module.folder_path) {
                Ok(PatchOutcome::Applied { file }) => {
                    info!(
                        patch = %descriptor.id,
                        file = %file.display(),
                        "applied patch"
                    );
                    summary.files_patched += 1;
                }
                Ok(PatchOutcome::NothingToApply) => {
                    debug!(patch = %descriptor.id, "empty patch, nothing to apply");
                }
                Err(e) => {
                    warn!(
                        patch = %descriptor.id,
                        module = %module.folder_path.display(),
                        error = %e,
                        "failed to apply patch, skipping rest of module"
                    );
                    summary.failures.push(format!(
                        "{}@{} ({}): {}",
                        module.name, module.version, descriptor.id, e
                    ));
                    return;
                }
            }
        }
    }
}
