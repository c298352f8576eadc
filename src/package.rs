//! Packaging pipeline
//!
//! Ties the pieces together in a fixed order:
//! 1. Resolve the version from the engine header
//! 2. Validate the declared object artifacts
//! 3. Query the runtime config tool for glue headers and the module suffix
//! 4. Run the build driver
//! 5. Verify the artifacts exist
//! 6. Compile the glue sources and link the module
//!
//! Every failure is fatal; nothing is packaged after an error.

use crate::config::Config;
use crate::extensions::manifest::join_paths;
use crate::extensions::{
    BuildDriver, BuildResult, BuildState, ExtensionBuilder, ExtensionDescriptor, GlueSpec, Linker,
    RuntimeConfig,
};
use crate::version::{VersionString, resolve_version};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort packaging
#[derive(Debug, Error)]
pub enum PackagingError {
    /// Missing version, unreadable header, or invalid manifest
    #[error("{message}")]
    Configuration { message: String },

    /// The build driver exited abnormally
    #[error("Could not build {}", join_paths(.artifacts))]
    NativeBuildFailure {
        artifacts: Vec<PathBuf>,
        exit_code: Option<i32>,
        output: String,
    },

    /// The driver succeeded but declared artifacts are absent
    #[error("Build succeeded but declared artifacts are missing: {}", join_paths(.missing))]
    MissingArtifacts { missing: Vec<PathBuf> },

    /// Glue compilation or the final link failed
    #[error("{message}")]
    Link { message: String, output: String },

    /// A builder operation was attempted out of order
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: BuildState,
    },
}

impl PackagingError {
    /// Captured toolchain output, if the failure has any
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::NativeBuildFailure { output, .. } | Self::Link { output, .. } => {
                Some(output.as_str()).filter(|o| !o.trim().is_empty())
            }
            _ => None,
        }
    }
}

/// Declarative package metadata
///
/// Consumed by distribution tooling, never by the build itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    pub url: String,
    pub description: String,
    pub author: String,
    pub author_email: String,
}

/// Outcome of a packaging run
#[derive(Debug, Clone)]
pub struct PackageReport {
    /// Package metadata with the resolved version
    pub metadata: PackageMetadata,
    /// Descriptor handed to the linker
    pub descriptor: ExtensionDescriptor,
    /// Result of the object build
    pub build: BuildResult,
    /// Produced module (`None` when linking was skipped)
    pub extension: Option<PathBuf>,
}

/// Packaging pipeline for one project
#[derive(Debug)]
pub struct Packager<'a> {
    config: &'a Config,
    root: PathBuf,
    out_dir: PathBuf,
    skip_link: bool,
}

impl<'a> Packager<'a> {
    /// Create a pipeline over `config`, rooted at `root`.
    #[must_use]
    pub fn new(config: &'a Config, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root: root.into(),
            out_dir: PathBuf::from(&config.extension.out_dir),
            skip_link: false,
        }
    }

    /// Override the output directory (relative to the root unless absolute)
    #[must_use]
    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    /// Stop after the object build and artifact verification
    ///
    /// The runtime config tool is not queried when linking is skipped.
    #[must_use]
    pub const fn skip_link(mut self, skip: bool) -> Self {
        self.skip_link = skip;
        self
    }

    /// Resolve the package version from the configured header.
    ///
    /// # Errors
    ///
    /// Returns `PackagingError::Configuration` if no version can be resolved.
    pub fn resolve_version(&self) -> Result<VersionString, PackagingError> {
        let header = self.root.join(&self.config.version.header);
        resolve_version(&header, &self.config.version.macro_name)
    }

    /// Package metadata with the resolved version.
    ///
    /// # Errors
    ///
    /// Returns `PackagingError::Configuration` if no version can be resolved.
    pub fn metadata(&self) -> Result<PackageMetadata, PackagingError> {
        let version = self.resolve_version()?;
        Ok(self.config.package.metadata(&version))
    }

    /// Builder for this project, in the `Pending` state.
    ///
    /// # Errors
    ///
    /// Returns `PackagingError::Configuration` if the manifest is invalid or
    /// the runtime config tool fails.
    pub fn builder(&self) -> Result<ExtensionBuilder, PackagingError> {
        let manifest = self.config.artifact_manifest()?;
        Ok(ExtensionBuilder::new(&self.root, manifest, self.glue_spec()?))
    }

    /// Glue settings from the manifest, completed by the runtime config tool.
    ///
    /// Runtime include dirs and flags come after the declared ones. The
    /// runtime's suffix only applies when `extension.suffix` is unset.
    fn glue_spec(&self) -> Result<GlueSpec, PackagingError> {
        let mut glue = self.config.glue_spec()?;

        if !self.skip_link
            && let Some(program) = self.config.extension.runtime_config()
        {
            let runtime = RuntimeConfig::query(program, &self.root)?;
            glue.include_dirs.extend(runtime.include_dirs);
            glue.extra_compile_args.extend(runtime.compile_args);
            if self.config.extension.suffix.is_none()
                && let Some(suffix) = runtime.extension_suffix
            {
                glue.suffix = suffix;
            }
        }

        Ok(glue)
    }

    /// Run the whole pipeline.
    ///
    /// The version is resolved, the manifest validated and the runtime
    /// queried before the driver is invoked; the linker only runs after
    /// every artifact is verified.
    ///
    /// # Errors
    ///
    /// Returns the first `PackagingError` encountered.
    pub fn run(
        &self,
        driver: &dyn BuildDriver,
        linker: &dyn Linker,
    ) -> Result<PackageReport, PackagingError> {
        let metadata = self.metadata()?;
        let mut builder = self.builder()?;

        crate::debug!(
            "Packaging {} {} from {}",
            metadata.name,
            metadata.version,
            self.root.display()
        );

        let build = builder.build(driver)?.clone();
        builder.verify_artifacts()?;
        let descriptor = builder.descriptor()?;

        let extension = if self.skip_link {
            crate::debug!("Skipping link step for {}", descriptor.name);
            None
        } else {
            Some(linker.link(&descriptor, &self.root, &self.out_dir)?)
        };

        Ok(PackageReport {
            metadata,
            descriptor,
            build,
            extension,
        })
    }
}
