//! Per-resource source routing.
//!
//! Where a packaged resource's bytes come from depends on how the
//! engine was deployed: bundled into the application, provided by a
//! separately installed runtime package, or downloaded into a private
//! cache. The router is installed as the extraction subsystem's lookup
//! hook; it decides, per resource name, which source owns the bytes and
//! opens it. It never caches, retries, or writes; copy-once
//! persistence belongs to the extraction subsystem.

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;
use xwalk_host::{resource_identifier, HostContext, ResourceId, ResourceKind};

use crate::catalog::ResourceCatalog;

/// Manifest metadata key enabling download mode.
pub const DOWNLOAD_MODE_KEY: &str = "xwalk_enable_download_mode";

/// Name of the private directory download mode extracts into.
pub const DOWNLOAD_CACHE_DIR: &str = "extracted_xwalkcore";

/// Test bundles carry the packaged resource bundle directly in their
/// assets; its presence at the asset root is the marker.
const TEST_BUNDLE_MARKER: &str = "xwalk.pak";

/// How the engine's libraries and resources were deployed. Derived once
/// and treated as constant for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    /// Everything is bundled inside the host application.
    Embedded,
    /// A separately installed runtime package provides the engine.
    Shared,
    /// Resources are fetched into a private cache directory.
    Download,
    /// An embedded-mode test harness keeping resources in its assets.
    TestBundle,
}

impl DeploymentMode {
    /// Derive the deployment mode from the host context.
    ///
    /// Shared mode wins whenever the host's package identity differs
    /// from the application's. A test bundle is only recognized outside
    /// shared mode, by the marker resource at the asset root; an
    /// unlistable asset root counts as "no marker". Download mode
    /// requires the manifest flag to read `enable` (case-insensitive);
    /// absence or any read failure means off.
    pub fn detect(host: &dyn HostContext) -> Self {
        if host.package_name() != host.application_package_name() {
            return DeploymentMode::Shared;
        }

        let has_marker = match host.assets().list("") {
            Ok(names) => names.iter().any(|n| n == TEST_BUNDLE_MARKER),
            Err(err) => {
                warn!("cannot list bundled assets: {err}");
                false
            }
        };
        if has_marker {
            return DeploymentMode::TestBundle;
        }

        if download_mode_enabled(host) {
            return DeploymentMode::Download;
        }
        DeploymentMode::Embedded
    }
}

fn download_mode_enabled(host: &dyn HostContext) -> bool {
    host.metadata(DOWNLOAD_MODE_KEY)
        .map(|value| value.eq_ignore_ascii_case("enable"))
        .unwrap_or(false)
}

/// The source a resource is served from, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// The application's bundled assets.
    AssetBundle,
    /// The private download-mode extraction cache.
    DownloadCache,
    /// A raw packaged resource resolved by identifier.
    RawResource,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::AssetBundle => write!(f, "the bundled assets"),
            SourceKind::DownloadCache => write!(f, "the extraction cache"),
            SourceKind::RawResource => write!(f, "the packaged raw resources"),
        }
    }
}

impl std::error::Error for SourceKind {}

/// Routing errors. A missing resource is a packaging or deployment
/// defect: the engine cannot start correctly without it, so these are
/// never silently skipped.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The selected source does not contain the resource.
    #[error("resource '{name}' missing from {source}")]
    Missing {
        /// The resource (or derived base name) that failed to resolve.
        name: String,
        /// The source that was consulted.
        source: SourceKind,
    },

    /// The private extraction-cache directory could not be resolved.
    #[error("failed to resolve the extraction cache directory")]
    CacheDir(#[from] io::Error),
}

/// A selected byte source, carrying just what it needs to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceSource {
    /// Open the name verbatim from the bundled assets.
    AssetBundle {
        /// Resource name as requested.
        name: String,
    },
    /// Open a file inside the private extraction cache.
    DownloadCache {
        /// Full path of the cached file.
        path: PathBuf,
    },
    /// Open a raw packaged resource by identifier.
    RawResource {
        /// Resolved identifier.
        id: ResourceId,
        /// Base name the identifier was resolved from.
        base: String,
    },
}

impl ResourceSource {
    /// Which kind of source this is.
    pub fn kind(&self) -> SourceKind {
        match self {
            ResourceSource::AssetBundle { .. } => SourceKind::AssetBundle,
            ResourceSource::DownloadCache { .. } => SourceKind::DownloadCache,
            ResourceSource::RawResource { .. } => SourceKind::RawResource,
        }
    }

    /// Open the source for reading.
    pub fn open(&self, host: &dyn HostContext) -> Result<Box<dyn Read + Send>, RouterError> {
        match self {
            ResourceSource::AssetBundle { name } => {
                host.assets()
                    .open(name)
                    .map_err(|_| RouterError::Missing {
                        name: name.clone(),
                        source: SourceKind::AssetBundle,
                    })
            }
            ResourceSource::DownloadCache { path } => match File::open(path) {
                Ok(file) => Ok(Box::new(file)),
                Err(_) => Err(RouterError::Missing {
                    name: path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    source: SourceKind::DownloadCache,
                }),
            },
            ResourceSource::RawResource { id, base } => {
                host.resources()
                    .open_raw(*id)
                    .map_err(|_| RouterError::Missing {
                        name: base.clone(),
                        source: SourceKind::RawResource,
                    })
            }
        }
    }
}

/// Decides, per resource name, where its bytes come from.
#[derive(Debug, Clone)]
pub struct ResourceSourceRouter {
    mode: DeploymentMode,
    names: HashSet<String>,
}

impl ResourceSourceRouter {
    /// Build a router for a deployment mode over a catalog's names.
    pub fn new(mode: DeploymentMode, catalog: &ResourceCatalog) -> Self {
        Self {
            mode,
            names: catalog.names().map(String::from).collect(),
        }
    }

    /// The mode this router was built for.
    pub fn mode(&self) -> DeploymentMode {
        self.mode
    }

    /// Whether this router, rather than some other mechanism, owns
    /// serving the resource.
    pub fn should_handle(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Select the source for a resource without opening it.
    ///
    /// Shared and test-bundle deployments serve from the bundled
    /// assets; download mode serves from the extraction cache;
    /// embedded mode truncates the name at its first extension
    /// separator and resolves it as a raw resource identifier.
    pub fn select(
        &self,
        host: &dyn HostContext,
        name: &str,
    ) -> Result<ResourceSource, RouterError> {
        match self.mode {
            DeploymentMode::Shared | DeploymentMode::TestBundle => Ok(ResourceSource::AssetBundle {
                name: name.to_string(),
            }),
            DeploymentMode::Download => {
                let dir = host.private_dir(DOWNLOAD_CACHE_DIR)?;
                Ok(ResourceSource::DownloadCache {
                    path: dir.join(name),
                })
            }
            DeploymentMode::Embedded => {
                let base = name.split('.').next().unwrap_or(name);
                match resource_identifier(host, base, ResourceKind::Raw) {
                    Some(id) => Ok(ResourceSource::RawResource {
                        id,
                        base: base.to_string(),
                    }),
                    None => Err(RouterError::Missing {
                        name: base.to_string(),
                        source: SourceKind::RawResource,
                    }),
                }
            }
        }
    }

    /// Select and open the source for a resource.
    pub fn open(
        &self,
        host: &dyn HostContext,
        name: &str,
    ) -> Result<Box<dyn Read + Send>, RouterError> {
        self.select(host, name)?.open(host)
    }
}
