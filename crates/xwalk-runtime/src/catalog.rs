//! The authoritative set of packaged resources to manage.
//!
//! Applications may declare the full list as a string-array resource;
//! when they don't, a fixed minimal set known to be required for the
//! engine to start is used instead. Built exactly once per process
//! context and immutable afterwards.

use std::collections::HashMap;

use tracing::debug;
use xwalk_host::{resource_identifier, HostContext, ResourceId, ResourceKind};

/// Logical name of the declared resources-list array.
pub const RESOURCES_LIST_RESOURCE: &str = "xwalk_resources_list";

/// Fallback set: resources the engine cannot start without.
pub const MANDATORY_RESOURCES: &[&str] = &["xwalk.pak", "icudtl.dat", "xwalk_100_percent.pak"];

/// One managed resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    /// Canonical resource name, extension included.
    pub name: String,
    /// Numeric identifier slot, assigned later by the extraction layer.
    /// Always unassigned at catalog-build time.
    pub raw_id: Option<ResourceId>,
}

impl ResourceEntry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            raw_id: None,
        }
    }
}

/// Mapping from resource name to its entry, keys unique.
#[derive(Debug, Clone)]
pub struct ResourceCatalog {
    entries: HashMap<String, ResourceEntry>,
}

impl ResourceCatalog {
    /// Build the catalog for a host.
    ///
    /// Uses the declared [`RESOURCES_LIST_RESOURCE`] array when it
    /// resolves in either package namespace; otherwise falls back to
    /// [`MANDATORY_RESOURCES`]. Duplicate names collapse.
    pub fn build(host: &dyn HostContext) -> Self {
        let declared = resource_identifier(host, RESOURCES_LIST_RESOURCE, ResourceKind::Array)
            .and_then(|id| host.resources().string_array(id));

        let names: Vec<String> = match declared {
            Some(names) => names,
            None => {
                debug!("no declared resources list; using the mandatory set");
                MANDATORY_RESOURCES.iter().map(|s| s.to_string()).collect()
            }
        };

        let mut entries = HashMap::new();
        for name in &names {
            entries.insert(name.clone(), ResourceEntry::new(name));
        }
        Self { entries }
    }

    /// Whether `name` is a managed resource.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Managed resource names, no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The entries themselves, for handing to the extraction layer.
    pub fn entries(&self) -> Vec<ResourceEntry> {
        self.entries.values().cloned().collect()
    }

    /// Number of managed resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
