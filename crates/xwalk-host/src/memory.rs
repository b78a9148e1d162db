//! In-memory host context.
//!
//! Test bundles ship the engine's resources alongside the application's
//! own, and embedder test suites need a host they can assemble by hand.
//! `MemoryHost` serves both: assets and resources live in maps, the
//! resource table assigns its own identifiers, and private directories
//! are rooted wherever the caller points them.

use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::path::PathBuf;

use crate::context::{AssetStore, HostContext, ResourceId, ResourceKind, ResourceTable};

/// Map-backed asset store.
#[derive(Debug, Default)]
pub struct MemoryAssets {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset, replacing any previous bytes under the same name.
    pub fn insert(&mut self, name: &str, data: Vec<u8>) {
        self.files.insert(name.to_string(), data);
    }
}

impl AssetStore for MemoryAssets {
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>> {
        match self.files.get(name) {
            Some(data) => Ok(Box::new(Cursor::new(data.clone()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no asset named '{name}'"),
            )),
        }
    }

    fn list(&self, dir: &str) -> io::Result<Vec<String>> {
        let prefix = if dir.is_empty() || dir.ends_with('/') {
            dir.to_string()
        } else {
            format!("{dir}/")
        };
        let mut names: Vec<String> = self
            .files
            .keys()
            .filter_map(|name| name.strip_prefix(&prefix))
            // Only direct children, same as a directory listing.
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
            .map(String::from)
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Map-backed resource table that assigns its own identifiers.
#[derive(Debug)]
pub struct MemoryResources {
    ids: HashMap<(String, ResourceKind, String), ResourceId>,
    arrays: HashMap<ResourceId, Vec<String>>,
    raw: HashMap<ResourceId, Vec<u8>>,
    next_id: u32,
}

impl Default for MemoryResources {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryResources {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            arrays: HashMap::new(),
            raw: HashMap::new(),
            // Identifier zero is reserved as "unresolved" by convention.
            next_id: 1,
        }
    }

    fn assign(&mut self, package: &str, kind: ResourceKind, name: &str) -> ResourceId {
        let id = ResourceId(self.next_id);
        self.next_id += 1;
        self.ids
            .insert((package.to_string(), kind, name.to_string()), id);
        id
    }

    /// Register a string-array resource under a package namespace.
    pub fn insert_array(&mut self, package: &str, name: &str, entries: Vec<String>) -> ResourceId {
        let id = self.assign(package, ResourceKind::Array, name);
        self.arrays.insert(id, entries);
        id
    }

    /// Register a raw resource under a package namespace.
    pub fn insert_raw(&mut self, package: &str, name: &str, data: Vec<u8>) -> ResourceId {
        let id = self.assign(package, ResourceKind::Raw, name);
        self.raw.insert(id, data);
        id
    }
}

impl ResourceTable for MemoryResources {
    fn identifier(&self, name: &str, kind: ResourceKind, package: &str) -> Option<ResourceId> {
        self.ids
            .get(&(package.to_string(), kind, name.to_string()))
            .copied()
    }

    fn string_array(&self, id: ResourceId) -> Option<Vec<String>> {
        self.arrays.get(&id).cloned()
    }

    fn open_raw(&self, id: ResourceId) -> io::Result<Box<dyn Read + Send>> {
        match self.raw.get(&id) {
            Some(data) => Ok(Box::new(Cursor::new(data.clone()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no raw resource with id {}", id.0),
            )),
        }
    }
}

/// A complete in-memory [`HostContext`].
#[derive(Debug)]
pub struct MemoryHost {
    package: String,
    application_package: String,
    logical_package: String,
    assets: MemoryAssets,
    resources: MemoryResources,
    metadata: HashMap<String, String>,
    data_root: Option<PathBuf>,
}

impl MemoryHost {
    /// Create a host with the given component and application package
    /// identities. The logical package starts out equal to the
    /// component package.
    pub fn new(package: &str, application_package: &str) -> Self {
        Self {
            package: package.to_string(),
            application_package: application_package.to_string(),
            logical_package: package.to_string(),
            assets: MemoryAssets::new(),
            resources: MemoryResources::new(),
            metadata: HashMap::new(),
            data_root: None,
        }
    }

    /// Override the compile-time package identifier.
    pub fn set_logical_package(&mut self, package: &str) {
        self.logical_package = package.to_string();
    }

    /// Declare a manifest metadata value.
    pub fn set_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    /// Root directory under which private dirs are created.
    pub fn set_data_root(&mut self, root: PathBuf) {
        self.data_root = Some(root);
    }

    /// Mutable access to the asset store.
    pub fn assets_mut(&mut self) -> &mut MemoryAssets {
        &mut self.assets
    }

    /// Mutable access to the resource table.
    pub fn resources_mut(&mut self) -> &mut MemoryResources {
        &mut self.resources
    }
}

impl HostContext for MemoryHost {
    fn package_name(&self) -> &str {
        &self.package
    }

    fn application_package_name(&self) -> &str {
        &self.application_package
    }

    fn logical_package_name(&self) -> &str {
        &self.logical_package
    }

    fn assets(&self) -> &dyn AssetStore {
        &self.assets
    }

    fn resources(&self) -> &dyn ResourceTable {
        &self.resources
    }

    fn metadata(&self, key: &str) -> Option<String> {
        self.metadata.get(key).cloned()
    }

    fn private_dir(&self, name: &str) -> io::Result<PathBuf> {
        let root = self.data_root.as_ref().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no private data root configured")
        })?;
        let dir = root.join(name);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
