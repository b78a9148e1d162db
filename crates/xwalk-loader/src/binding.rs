//! The native side of the engine.
//!
//! [`EngineBinding`] is the seam between provisioning policy and the
//! platform's dynamic loader. The real implementation wraps
//! `libloading`; tests substitute a recording fake.

use std::collections::HashMap;
use std::path::Path;

use libloading::Library;

use crate::error::LoaderError;

/// Exported by the engine library; reports whether the binary was built
/// for the IA (x86-class) instruction-set family.
const BUILT_FOR_IA_SYMBOL: &[u8] = b"xwalk_is_library_built_for_ia\0";

/// Loading and introspection operations on the engine's native code.
pub trait EngineBinding {
    /// Load a library by name through the platform's standard search
    /// path. Loading an already-loaded library is a no-op.
    fn load_named(&mut self, library: &str) -> Result<(), LoaderError>;

    /// Load a library from an absolute path under `dir`, using the
    /// platform's library file naming.
    fn load_from_dir(&mut self, dir: &Path, library: &str) -> Result<(), LoaderError>;

    /// Load the libraries declared at build time. May overlap with the
    /// mandatory set; re-loading an already-loaded library is a no-op.
    fn load_declared(&mut self) -> Result<(), LoaderError>;

    /// Whether the loaded engine binary was built for the IA family.
    /// Errors when no loaded library carries the marker.
    fn built_for_ia(&self) -> Result<bool, LoaderError>;
}

/// `libloading`-backed [`EngineBinding`].
///
/// Loaded libraries are kept alive for the lifetime of the binding,
/// which the embedder is expected to hold for the process lifetime.
pub struct DynamicBinding {
    declared: Vec<String>,
    libraries: HashMap<String, Library>,
}

impl DynamicBinding {
    /// Create a binding with no build-time-declared libraries.
    pub fn new() -> Self {
        Self::with_declared(Vec::new())
    }

    /// Create a binding whose [`EngineBinding::load_declared`] loads
    /// the given library names.
    pub fn with_declared(declared: Vec<String>) -> Self {
        Self {
            declared,
            libraries: HashMap::new(),
        }
    }

    fn insert(&mut self, library: &str, lib: Library) {
        self.libraries.insert(library.to_string(), lib);
    }
}

impl Default for DynamicBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBinding for DynamicBinding {
    fn load_named(&mut self, library: &str) -> Result<(), LoaderError> {
        if self.libraries.contains_key(library) {
            return Ok(());
        }
        let file = libloading::library_filename(library);
        let lib = unsafe { Library::new(&file) }.map_err(|err| LoaderError::Open {
            library: library.to_string(),
            reason: err.to_string(),
        })?;
        self.insert(library, lib);
        Ok(())
    }

    fn load_from_dir(&mut self, dir: &Path, library: &str) -> Result<(), LoaderError> {
        if self.libraries.contains_key(library) {
            return Ok(());
        }
        let path = dir.join(libloading::library_filename(library));
        let lib = unsafe { Library::new(&path) }.map_err(|err| LoaderError::Open {
            library: library.to_string(),
            reason: err.to_string(),
        })?;
        self.insert(library, lib);
        Ok(())
    }

    fn load_declared(&mut self) -> Result<(), LoaderError> {
        for library in self.declared.clone() {
            self.load_named(&library)?;
        }
        Ok(())
    }

    fn built_for_ia(&self) -> Result<bool, LoaderError> {
        for lib in self.libraries.values() {
            let marker = unsafe { lib.get::<unsafe extern "C" fn() -> u8>(BUILT_FOR_IA_SYMBOL) };
            if let Ok(marker) = marker {
                return Ok(unsafe { marker() } != 0);
            }
        }
        Err(LoaderError::Introspection)
    }
}
