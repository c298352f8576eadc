//! Declared object artifacts
//!
//! The objects the build driver must produce are fixed at author time, not
//! discovered. Validating them up front means a typo or stale entry fails
//! before the external build runs instead of surfacing as a link error.

use crate::package::PackagingError;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Object file extensions accepted in a manifest
const OBJECT_EXTENSIONS: [&str; 2] = ["o", "obj"];

/// Ordered, validated list of required object artifacts
///
/// Paths are relative to the project root. Declaration order is preserved
/// and is the order handed to both the build driver and the linker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactManifest {
    objects: Vec<PathBuf>,
}

impl ArtifactManifest {
    /// Build a manifest from declared paths.
    ///
    /// # Errors
    ///
    /// Returns `PackagingError::Configuration` if the list is empty, or any
    /// entry is absolute, escapes the root, is not an object file, or is
    /// declared twice.
    ///
    /// `.` components are dropped before validation, so `./core/vm.o` is
    /// stored (and deduplicated) as `core/vm.o`.
    pub fn new<I, P>(objects: I) -> Result<Self, PackagingError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let objects: Vec<PathBuf> = objects
            .into_iter()
            .map(|object| normalize(&object.into()))
            .collect();

        if objects.is_empty() {
            return Err(invalid("no object artifacts declared".to_string()));
        }

        let mut seen = HashSet::with_capacity(objects.len());
        for object in &objects {
            validate_entry(object)?;
            if !seen.insert(object.as_path()) {
                return Err(invalid(format!(
                    "object artifact declared twice: {}",
                    object.display()
                )));
            }
        }

        Ok(Self { objects })
    }

    /// Declared objects, in order
    #[must_use]
    pub fn objects(&self) -> &[PathBuf] {
        &self.objects
    }

    /// Number of declared objects
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Always false for a constructed manifest
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects resolved against `root`
    #[must_use]
    pub fn resolve(&self, root: &Path) -> Vec<PathBuf> {
        self.objects.iter().map(|o| root.join(o)).collect()
    }

    /// Declared objects that are not regular files under `root`
    #[must_use]
    pub fn missing(&self, root: &Path) -> Vec<PathBuf> {
        self.objects
            .iter()
            .filter(|o| !root.join(o).is_file())
            .cloned()
            .collect()
    }

    /// Comma-separated list for messages (`core/lexer.o, core/vm.o`)
    #[must_use]
    pub fn display_list(&self) -> String {
        join_paths(&self.objects)
    }
}

/// Drop `.` components (`./core/vm.o` -> `core/vm.o`)
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Join paths with ", " for user-facing messages
#[must_use]
pub fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn validate_entry(object: &Path) -> Result<(), PackagingError> {
    if object.as_os_str().is_empty() {
        return Err(invalid("empty object artifact path".to_string()));
    }

    if object.is_absolute() || object.has_root() {
        return Err(invalid(format!(
            "object artifact must be relative to the project root: {}",
            object.display()
        )));
    }

    if object
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        return Err(invalid(format!(
            "object artifact escapes the project root: {}",
            object.display()
        )));
    }

    let is_object = object
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| OBJECT_EXTENSIONS.contains(&e));
    if !is_object {
        return Err(invalid(format!(
            "not an object file (expected .o or .obj): {}",
            object.display()
        )));
    }

    Ok(())
}

fn invalid(message: String) -> PackagingError {
    PackagingError::Configuration {
        message: format!("Invalid artifact manifest: {message}"),
    }
}
