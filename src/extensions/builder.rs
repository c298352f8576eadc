//! Extension Builder Orchestration
//!
//! Runs the build driver for the declared objects, checks the outcome, and
//! assembles the descriptor for the link step. One builder handles exactly
//! one build; a failed native build is always fatal.

use super::driver::BuildDriver;
use super::manifest::{ArtifactManifest, join_paths};
use super::types::{BuildResult, BuildState, ExtensionDescriptor, LinkLanguage};
use crate::package::PackagingError;
use std::path::PathBuf;

/// Glue-side settings for the descriptor
///
/// Everything about the extension except its object artifacts, which come
/// from the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlueSpec {
    /// Module name (the runtime's import identifier)
    pub name: String,
    /// Glue sources, relative to the project root
    pub sources: Vec<PathBuf>,
    /// Link language
    pub language: LinkLanguage,
    /// Include directories for the glue sources
    pub include_dirs: Vec<PathBuf>,
    /// Extra compile flags
    pub extra_compile_args: Vec<String>,
    /// Extra link flags
    pub extra_link_args: Vec<String>,
    /// Module file suffix
    pub suffix: String,
}

/// Object build coordinator
#[derive(Debug)]
pub struct ExtensionBuilder {
    /// Directory the driver runs in; artifact paths are relative to it
    root: PathBuf,
    /// Objects the driver must produce
    manifest: ArtifactManifest,
    /// Glue-side descriptor settings
    glue: GlueSpec,
    /// Current lifecycle state
    state: BuildState,
    /// Result of the driver run, once it has happened
    result: Option<BuildResult>,
}

impl ExtensionBuilder {
    /// Create a builder in the `Pending` state.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, manifest: ArtifactManifest, glue: GlueSpec) -> Self {
        Self {
            root: root.into(),
            manifest,
            glue,
            state: BuildState::Pending,
            result: None,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> BuildState {
        self.state
    }

    /// Declared object artifacts
    #[must_use]
    pub const fn manifest(&self) -> &ArtifactManifest {
        &self.manifest
    }

    /// Result of the driver run, if it has happened
    #[must_use]
    pub const fn result(&self) -> Option<&BuildResult> {
        self.result.as_ref()
    }

    fn transition(&mut self, next: BuildState) {
        crate::debug!("Extension {}: {} -> {}", self.glue.name, self.state, next);
        self.state = next;
    }

    /// Run the driver for every declared object.
    ///
    /// Blocks until the driver exits. On success the builder moves to
    /// `BuildSucceeded` and returns the build result. On failure it moves
    /// through `BuildFailed` to `Aborted`.
    ///
    /// # Errors
    ///
    /// Returns `PackagingError::NativeBuildFailure` naming every requested
    /// artifact when the driver fails, or `PackagingError::InvalidState` if
    /// this builder already ran.
    pub fn build(&mut self, driver: &dyn BuildDriver) -> Result<&BuildResult, PackagingError> {
        if self.state != BuildState::Pending {
            return Err(PackagingError::InvalidState {
                operation: "build",
                state: self.state,
            });
        }

        self.transition(BuildState::BuildRunning);
        let result = driver.build(&self.root, &self.manifest);

        if result.success {
            crate::debug!(
                "Built {} in {:?}",
                self.manifest.display_list(),
                result.duration
            );
            self.transition(BuildState::BuildSucceeded);
            Ok(&*self.result.insert(result))
        } else {
            self.transition(BuildState::BuildFailed);
            let error = PackagingError::NativeBuildFailure {
                artifacts: self.manifest.objects().to_vec(),
                exit_code: result.exit_code,
                output: result.output.clone(),
            };
            self.result = Some(result);
            self.transition(BuildState::Aborted);
            Err(error)
        }
    }

    /// Check that every declared artifact exists after a successful build.
    ///
    /// # Errors
    ///
    /// Returns `PackagingError::MissingArtifacts` listing every absent object,
    /// or `PackagingError::InvalidState` if the build has not succeeded.
    pub fn verify_artifacts(&mut self) -> Result<(), PackagingError> {
        self.require_success("verify artifacts")?;

        let missing = self.manifest.missing(&self.root);
        if missing.is_empty() {
            crate::debug!("Verified {} object artifacts", self.manifest.len());
            return Ok(());
        }

        crate::debug!("Missing object artifacts: {}", join_paths(&missing));
        self.transition(BuildState::Aborted);
        Err(PackagingError::MissingArtifacts { missing })
    }

    /// Descriptor for the link step.
    ///
    /// The manifest objects, glue sources, and link language are passed
    /// through unmodified.
    ///
    /// # Errors
    ///
    /// Returns `PackagingError::InvalidState` unless the build succeeded.
    pub fn descriptor(&self) -> Result<ExtensionDescriptor, PackagingError> {
        self.require_success("assemble descriptor")?;
        Ok(self.describe())
    }

    /// Descriptor without checking build state (for display only)
    #[must_use]
    pub fn describe(&self) -> ExtensionDescriptor {
        ExtensionDescriptor {
            name: self.glue.name.clone(),
            sources: self.glue.sources.clone(),
            extra_objects: self.manifest.objects().to_vec(),
            language: self.glue.language,
            include_dirs: self.glue.include_dirs.clone(),
            extra_compile_args: self.glue.extra_compile_args.clone(),
            extra_link_args: self.glue.extra_link_args.clone(),
            suffix: self.glue.suffix.clone(),
        }
    }

    fn require_success(&self, operation: &'static str) -> Result<(), PackagingError> {
        if self.state == BuildState::BuildSucceeded {
            Ok(())
        } else {
            Err(PackagingError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}
