//! Bootstrap error types.

use thiserror::Error;
use xwalk_loader::LoaderError;

use crate::engine::EngineError;

/// Errors that abort the one-time init sequence.
#[derive(Debug, Error)]
pub enum InitError {
    /// The engine library was loaded through a binary-translation
    /// layer. Remediation is fetching an architecture-matched package,
    /// not retrying.
    #[error("engine library runs under binary translation; an architecture-matched package is required")]
    EmulatedLibrary,

    /// A mandatory native library could not be loaded.
    #[error("failed to load the engine's native libraries")]
    Load(#[from] LoaderError),

    /// The extraction subsystem failed to materialize the catalog.
    #[error("failed to extract packaged resources")]
    Extraction(#[source] EngineError),

    /// Browser-process startup failed; initialization cannot proceed.
    #[error("cannot initialize the browser process")]
    Startup(#[source] EngineError),
}
