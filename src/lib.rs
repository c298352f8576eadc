//! extbind internal library code
//!
//! Builds a language engine's prebuilt objects and links them into a
//! loadable extension module, versioned from the engine's own header.

pub mod config;
pub mod debug;
pub mod env_vars;
pub mod extensions;
pub mod package;
pub mod paths;
pub mod version;

#[cfg(test)]
pub mod test_utils;

// Re-export common types for convenience
pub use config::{Config, MANIFEST_FILE};
pub use debug::{debug_log, init_debug, is_debug_enabled};
pub use extensions::{
    ArtifactManifest, BuildDriver, BuildResult, BuildState, ExtensionBuilder, ExtensionDescriptor,
    GlueSpec, LinkLanguage, Linker, MakeDriver, RuntimeConfig, SystemLinker,
};
pub use package::{PackageMetadata, PackageReport, Packager, PackagingError};
pub use paths::find_manifest_in;
pub use version::{VersionString, find_version, resolve_version};
