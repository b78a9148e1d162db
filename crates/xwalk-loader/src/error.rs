//! Loader error types.

use thiserror::Error;

/// Errors that can occur while loading the engine's native libraries.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// A native library could not be opened or linked.
    #[error("failed to load native library '{library}': {reason}")]
    Open {
        /// Library name as passed to the loader.
        library: String,
        /// Platform loader diagnostic.
        reason: String,
    },

    /// The loaded engine binary exposes no architecture marker, so its
    /// instruction-set family cannot be verified.
    #[error("loaded engine binary exposes no architecture marker")]
    Introspection,
}
