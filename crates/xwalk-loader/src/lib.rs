//! Native-library provisioning for the Crosswalk bootstrap.
//!
//! Loads the engine's mandatory native libraries exactly once per
//! process context and verifies that the loaded binary matches the
//! device's instruction-set family before reporting success. An ARM
//! build running on an x86 device through a binary-translation layer is
//! detected here and reported as a typed outcome so the embedder can
//! fetch an architecture-matched package instead of limping on.

pub mod binding;
pub mod error;
pub mod provision;

pub use binding::{DynamicBinding, EngineBinding};
pub use error::LoaderError;
pub use provision::{provision_libraries, LoadState, MANDATORY_LIBRARIES};
