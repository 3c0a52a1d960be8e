//! Shared data model for Remedy.
//!
//! This crate defines the types passed between the policy parser, the
//! dependency-tree scanner, the patch catalog client, and the orchestrator.
//! It holds no behavior beyond simple accessors.
//!
//! # Architecture
//!
//! This is the foundation crate of the workspace:
//! - Depends on: serde only
//! - Used by: remedy-scan, remedy-catalog, remedy (orchestrator)

mod types;

pub use types::{PackageAndVersion, PatchCatalog, PatchDescriptor, PhysicalModule};
