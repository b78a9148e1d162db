//! The one-time init gate.
//!
//! All bootstrap state lives in a [`BootContext`] owned by the caller;
//! nothing here is process-global, so embedder tests can run the whole
//! sequence repeatedly with fresh contexts. The sequence itself runs
//! once per context, serially. Callers must not invoke it concurrently
//! from multiple threads (documented discipline, flags not locks).

use std::path::Path;

use tracing::debug;
use xwalk_host::{DeviceAbi, HostContext, PlatformAbi};
use xwalk_loader::{provision_libraries, EngineBinding, LoadState, LoaderError};

use crate::catalog::ResourceCatalog;
use crate::command_line::read_command_line;
use crate::engine::EngineRuntime;
use crate::error::InitError;
use crate::router::{DeploymentMode, ResourceSourceRouter};

/// Suffix of the engine's process-private storage location.
pub const PRIVATE_DATA_SUFFIX: &str = "xwalkcore";

/// Caller-owned bootstrap state.
///
/// Holds the library load state, the lazily probed device ABI, and the
/// idempotency flag guarding the init sequence. The ABI is probed at
/// most once, on first use.
#[derive(Debug, Default)]
pub struct BootContext {
    load: LoadState,
    device_abi: Option<DeviceAbi>,
    initialized: bool,
}

impl BootContext {
    /// Create a fresh context: nothing loaded, nothing probed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the full init sequence has completed.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The current library load state.
    pub fn load_state(&self) -> LoadState {
        self.load
    }

    /// The device ABI, probing the platform on first use.
    pub fn device_abi(&mut self, platform: &dyn PlatformAbi) -> &DeviceAbi {
        self.device_abi
            .get_or_insert_with(|| DeviceAbi::probe(platform))
    }

    /// Provision the engine's native libraries.
    ///
    /// Shared-runtime embedders call this directly with the library
    /// package's directory before [`initialize`], so they can react to
    /// an emulation mismatch (`Ok(false)`) by fetching an
    /// architecture-matched package. Idempotent once loading succeeded.
    pub fn provision(
        &mut self,
        platform: &dyn PlatformAbi,
        binding: &mut dyn EngineBinding,
        explicit_dir: Option<&Path>,
    ) -> Result<bool, LoaderError> {
        let abi = self
            .device_abi
            .get_or_insert_with(|| DeviceAbi::probe(platform));
        provision_libraries(&mut self.load, abi, binding, explicit_dir)
    }
}

/// Run the one-time bootstrap sequence.
///
/// Idempotent: once a context completed the sequence, further calls
/// return immediately. On the first call this provisions the native
/// libraries, configures private storage, re-registers resource
/// identifiers, seeds the command line if nobody else has, stages the
/// resource catalog with its source router, extracts, and starts the
/// browser process, blocking until the engine is ready. The context is
/// marked initialized only after every step succeeded.
pub fn initialize(
    ctx: &mut BootContext,
    host: &dyn HostContext,
    platform: &dyn PlatformAbi,
    binding: &mut dyn EngineBinding,
    engine: &mut dyn EngineRuntime,
) -> Result<(), InitError> {
    if ctx.initialized {
        return Ok(());
    }

    if !ctx.provision(platform, binding, None)? {
        return Err(InitError::EmulatedLibrary);
    }

    engine.set_private_data_suffix(PRIVATE_DATA_SUFFIX);

    // The application may have renamed its package at build time;
    // resource identifiers must be re-registered under the new name.
    engine.remap_resource_ids(host);

    // Last place the command line can be seeded. Downstream engine
    // code assumes the object exists, so create it here if no earlier
    // code path did.
    if !engine.command_line_initialized() {
        engine.init_command_line(read_command_line(host));
    }

    let catalog = ResourceCatalog::build(host);
    let mode = DeploymentMode::detect(host);
    debug!("deployment mode: {mode:?}, {} managed resources", catalog.len());
    let router = ResourceSourceRouter::new(mode, &catalog);
    engine.stage_resources(catalog.entries(), router);

    engine
        .extract_resources(host)
        .map_err(InitError::Extraction)?;

    engine
        .start_browser_process(host)
        .map_err(InitError::Startup)?;

    ctx.initialized = true;
    Ok(())
}
