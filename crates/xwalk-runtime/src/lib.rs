//! Crosswalk runtime bootstrap.
//!
//! Binds the pieces of engine startup together: decides where the
//! engine's native libraries and packaged resources physically live
//! (bundled, shared runtime package, or downloaded), provisions the
//! libraries with architecture verification, and runs the one-time init
//! sequence that hands the resource catalog and its source router to
//! the extraction subsystem before starting the browser process.

pub mod bootstrap;
pub mod catalog;
pub mod command_line;
pub mod engine;
pub mod error;
pub mod router;

pub use bootstrap::{initialize, BootContext, PRIVATE_DATA_SUFFIX};
pub use catalog::{ResourceCatalog, ResourceEntry, MANDATORY_RESOURCES, RESOURCES_LIST_RESOURCE};
pub use command_line::{read_command_line, COMMAND_LINE_FILE};
pub use engine::{EngineError, EngineRuntime};
pub use error::InitError;
pub use router::{
    DeploymentMode, ResourceSource, ResourceSourceRouter, RouterError, SourceKind,
    DOWNLOAD_CACHE_DIR, DOWNLOAD_MODE_KEY,
};
