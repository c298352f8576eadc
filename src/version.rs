//! Version resolution from the engine header.
//!
//! The package version is not declared anywhere in the manifest. It lives in
//! the engine's public header as a preprocessor definition, e.g.:
//!
//! ```c
//! #define LIB_JSONNET_VERSION "v0.20.0"
//! ```

use crate::package::PackagingError;
use std::fmt;
use std::fs;
use std::path::Path;

/// Preprocessor marker a version line must contain
const DEFINE_MARKER: &str = "#define";

/// A non-empty version token with quotes and surrounding whitespace removed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionString(String);

impl VersionString {
    /// Wrap a raw token, stripping quotes and whitespace.
    ///
    /// Returns `None` if nothing remains after stripping.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let token = raw.trim_matches(|c: char| c.is_whitespace() || c == '"');
        (!token.is_empty()).then(|| Self(token.to_string()))
    }

    /// The version text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scan header text for the version macro.
///
/// The first line containing both `#define` and `macro_name` wins. The token
/// is whatever follows the first occurrence of `macro_name` on that line.
/// Returns `None` when no line matches or the matching line carries no value.
#[must_use]
pub fn find_version(header: &str, macro_name: &str) -> Option<VersionString> {
    if macro_name.is_empty() {
        return None;
    }

    let line = header
        .lines()
        .find(|line| line.contains(DEFINE_MARKER) && line.contains(macro_name))?;

    let (_, rest) = line.split_once(macro_name)?;
    VersionString::new(rest)
}

/// Read `header_path` and resolve the version defined by `macro_name`.
///
/// # Errors
///
/// Returns `PackagingError::Configuration` if the header cannot be read or
/// does not define a non-empty value for the macro.
pub fn resolve_version(
    header_path: &Path,
    macro_name: &str,
) -> Result<VersionString, PackagingError> {
    let contents = fs::read_to_string(header_path).map_err(|e| PackagingError::Configuration {
        message: format!("Failed to read version header {}: {e}", header_path.display()),
    })?;

    let version = find_version(&contents, macro_name).ok_or_else(|| PackagingError::Configuration {
        message: format!(
            "Version macro {macro_name} not found in {}",
            header_path.display()
        ),
    })?;

    crate::debug!(
        "Resolved version {version} from {} ({macro_name})",
        header_path.display()
    );

    Ok(version)
}
