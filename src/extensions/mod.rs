//! Native extension building
//!
//! Builds the engine's prebuilt objects with an external driver and links
//! them, together with the glue sources, into one loadable module.
//!
//! Steps:
//! - Validate the declared object artifacts (`manifest`)
//! - Run the build driver (`driver`, usually `make`)
//! - Verify artifacts and assemble the descriptor (`builder`)
//! - Query the host runtime's headers and module suffix (`runtime`)
//! - Compile glue sources and link (`linker`)

pub mod builder;
pub mod driver;
pub mod linker;
pub mod manifest;
pub mod runtime;
pub mod types;

pub use builder::{ExtensionBuilder, GlueSpec};
pub use driver::{BuildDriver, MakeDriver};
pub use linker::{Linker, SystemLinker};
pub use manifest::ArtifactManifest;
pub use runtime::RuntimeConfig;
pub use types::{BuildResult, BuildState, ExtensionDescriptor, LinkLanguage};
