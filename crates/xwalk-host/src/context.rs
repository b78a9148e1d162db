//! Traits describing the embedding application.
//!
//! The bootstrap never talks to the platform directly; everything it
//! needs from the host application comes through [`HostContext`]. In
//! shared-runtime deployments the context belongs to the library
//! package, so the host's own identity and the embedding application's
//! identity can differ; that difference is what drives deployment-mode
//! detection.

use std::io::{self, Read};
use std::path::PathBuf;

/// Opaque identifier of a compiled packaged resource.
///
/// Assigned by the host's resource table; only ever obtained through
/// [`ResourceTable::identifier`] and passed back to the same table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(pub u32);

/// The resource namespaces the bootstrap looks things up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Raw packaged byte resources (embedded-mode resource payloads).
    Raw,
    /// String-array resources (the declared resources list).
    Array,
}

/// Read access to the application's bundled asset store.
pub trait AssetStore {
    /// Open an asset by name for reading.
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>>;

    /// List the asset names directly under `dir` (`""` is the root).
    fn list(&self, dir: &str) -> io::Result<Vec<String>>;
}

/// Read access to the application's compiled resource table.
pub trait ResourceTable {
    /// Resolve a resource name of the given kind within a package
    /// namespace. `None` when the name does not resolve there.
    fn identifier(&self, name: &str, kind: ResourceKind, package: &str) -> Option<ResourceId>;

    /// Read a string-array resource.
    fn string_array(&self, id: ResourceId) -> Option<Vec<String>>;

    /// Open a raw resource for reading.
    fn open_raw(&self, id: ResourceId) -> io::Result<Box<dyn Read + Send>>;
}

/// Everything the bootstrap needs from the embedding application.
pub trait HostContext {
    /// Package identity of this component. In shared mode this is the
    /// separately installed library package, not the application.
    fn package_name(&self) -> &str;

    /// Package identity of the embedding application itself.
    fn application_package_name(&self) -> &str;

    /// Compile-time package identifier. Stays fixed even when the
    /// application renames its package at build time, which is why
    /// resource lookups fall back to it.
    fn logical_package_name(&self) -> &str;

    /// The application's bundled assets.
    fn assets(&self) -> &dyn AssetStore;

    /// The application's compiled resource table.
    fn resources(&self) -> &dyn ResourceTable;

    /// A manifest metadata value, if declared.
    fn metadata(&self, key: &str) -> Option<String>;

    /// A process-private directory with the given name, created on
    /// demand.
    fn private_dir(&self, name: &str) -> io::Result<PathBuf>;
}

/// Resolve a resource identifier, tolerating build-time package renames.
///
/// Tries the host's own package namespace first, then the logical
/// package identifier. A tier that fails to resolve is skipped.
pub fn resource_identifier(
    host: &dyn HostContext,
    name: &str,
    kind: ResourceKind,
) -> Option<ResourceId> {
    host.resources()
        .identifier(name, kind, host.package_name())
        .or_else(|| {
            host.resources()
                .identifier(name, kind, host.logical_package_name())
        })
}
