//! Host-platform abstraction for the Crosswalk bootstrap.
//!
//! The bootstrap needs a handful of things from whatever application is
//! embedding the engine: its package identities, its bundled assets, its
//! compiled resource table, manifest metadata, and a place for private
//! data. This crate defines those seams as traits, provides the device
//! ABI probe, and ships an in-memory host implementation used by test
//! bundles and embedder tests.

pub mod abi;
pub mod context;
pub mod memory;

pub use abi::{DeviceAbi, PlatformAbi, SystemAbi};
pub use context::{
    resource_identifier, AssetStore, HostContext, ResourceId, ResourceKind, ResourceTable,
};
pub use memory::{MemoryAssets, MemoryHost, MemoryResources};
