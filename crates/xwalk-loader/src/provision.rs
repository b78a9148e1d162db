//! One-shot library provisioning with emulation detection.

use std::path::Path;

use tracing::debug;
use xwalk_host::DeviceAbi;

use crate::binding::EngineBinding;
use crate::error::LoaderError;

/// Native libraries the engine cannot start without.
pub const MANDATORY_LIBRARIES: &[&str] = &["xwalkcore"];

/// Per-process-context load outcome. Set at most once, never reset.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoadState {
    loaded: bool,
    loaded_via_emulation: bool,
}

impl LoadState {
    /// Create the initial (nothing loaded) state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the mandatory libraries were loaded and verified.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether a load was rejected because the binary runs under
    /// binary-translation emulation.
    pub fn via_emulation(&self) -> bool {
        self.loaded_via_emulation
    }
}

/// Load the mandatory native libraries, verifying architecture
/// compatibility before reporting success.
///
/// Idempotent: once `state` records a successful load, this returns
/// `Ok(true)` without touching the binding again. With `explicit_dir`
/// the libraries are loaded from absolute paths under that directory
/// (shared-runtime deployments), unless a previous call already
/// detected an emulation mismatch; otherwise they are loaded by name
/// through the platform's search path.
///
/// Returns `Ok(false)` (with `state.via_emulation()` set) when the
/// binary was not built for the IA family but the device's primary ABI
/// is x86-class: the engine would be running under binary translation,
/// a known source of crashes, and the caller should fetch an
/// architecture-matched package instead. Unresolvable libraries are a
/// hard error.
pub fn provision_libraries(
    state: &mut LoadState,
    abi: &DeviceAbi,
    binding: &mut dyn EngineBinding,
    explicit_dir: Option<&Path>,
) -> Result<bool, LoaderError> {
    if state.loaded {
        return Ok(true);
    }

    match explicit_dir {
        Some(dir) if !state.loaded_via_emulation => {
            for library in MANDATORY_LIBRARIES {
                binding.load_from_dir(dir, library)?;
            }
        }
        _ => {
            for library in MANDATORY_LIBRARIES {
                binding.load_named(library)?;
            }
        }
    }

    // Covers libraries declared at build time. May overlap with the
    // loads above; the path-based load is authoritative, so a failure
    // here is recorded and ignored.
    if let Err(err) = binding.load_declared() {
        debug!("declared-library load failed: {err}");
    }

    if binding.built_for_ia()? {
        debug!("native library is built for IA");
    } else {
        debug!("native library is built for ARM");
        if abi.is_x86_family() {
            state.loaded_via_emulation = true;
            return Ok(false);
        }
    }

    state.loaded = true;
    Ok(true)
}
