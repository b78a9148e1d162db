//! Interfaces to the engine-side collaborators.
//!
//! The bootstrap orchestrates pieces it does not own: the shared
//! command-line object, the resource-extraction subsystem, and browser
//! process startup. Their internals are out of scope here; this module
//! defines only the surface the init gate drives.

use thiserror::Error;
use xwalk_host::HostContext;

use crate::catalog::ResourceEntry;
use crate::router::ResourceSourceRouter;

/// Opaque failure reported by an engine-side collaborator.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

/// Operations the init gate needs from the engine side.
pub trait EngineRuntime {
    /// Whether the shared command-line object was already initialized
    /// by some earlier code path.
    fn command_line_initialized(&self) -> bool;

    /// Initialize the shared command-line object with the given
    /// arguments. Called at most once, and only when
    /// [`command_line_initialized`](Self::command_line_initialized)
    /// reported false.
    fn init_command_line(&mut self, args: Vec<String>);

    /// Configure the process-private storage location suffix.
    fn set_private_data_suffix(&mut self, suffix: &str);

    /// Re-register internal resource identifiers. Needed when the
    /// application renamed its package at build time.
    fn remap_resource_ids(&mut self, host: &dyn HostContext);

    /// Hand the extraction subsystem the catalog entries and install
    /// the router as its source-interception hook.
    fn stage_resources(&mut self, entries: Vec<ResourceEntry>, router: ResourceSourceRouter);

    /// Run the copy-once extraction of the staged resources.
    fn extract_resources(&mut self, host: &dyn HostContext) -> Result<(), EngineError>;

    /// Start the engine's browser process.
    ///
    /// Contract: implementations run this on the platform's designated
    /// UI thread and block until the engine reports ready, because
    /// downstream consumers assume a usable engine the moment init
    /// returns.
    fn start_browser_process(&mut self, host: &dyn HostContext) -> Result<(), EngineError>;
}
