//! Extension type definitions
//!
//! The engine's objects are built by an external driver and then linked,
//! together with a small glue source, into one loadable module. This module
//! defines the values that flow between those steps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Language used to drive the final link
///
/// Determines which compiler driver performs the link, and therefore which
/// runtime libraries get pulled in (`c++` links the C++ standard library).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkLanguage {
    /// Link with the C compiler driver (`CC`)
    #[serde(rename = "c")]
    C,
    /// Link with the C++ compiler driver (`CXX`)
    #[serde(rename = "c++", alias = "cxx", alias = "cpp")]
    Cxx,
}

impl LinkLanguage {
    /// Default compiler driver for this language
    #[must_use]
    pub const fn default_driver(self) -> &'static str {
        match self {
            Self::C => "cc",
            Self::Cxx => "c++",
        }
    }

    /// Compiler driver, honoring `CC`/`CXX`
    #[must_use]
    pub fn driver(self) -> String {
        let from_env = match self {
            Self::C => crate::env_vars::cc(),
            Self::Cxx => crate::env_vars::cxx(),
        };
        from_env.unwrap_or_else(|| self.default_driver().to_string())
    }

    /// Compiler flags from `CFLAGS`/`CXXFLAGS`
    #[must_use]
    pub fn env_flags(self) -> Vec<String> {
        let flags = match self {
            Self::C => crate::env_vars::cflags(),
            Self::Cxx => crate::env_vars::cxxflags(),
        };
        flags
            .as_deref()
            .map(crate::env_vars::split_flags)
            .unwrap_or_default()
    }
}

impl fmt::Display for LinkLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::C => f.write_str("c"),
            Self::Cxx => f.write_str("c++"),
        }
    }
}

/// Lifecycle of one object build
///
/// `Pending -> BuildRunning -> BuildSucceeded`, or
/// `Pending -> BuildRunning -> BuildFailed -> Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildState {
    /// Driver not yet invoked
    Pending,
    /// Driver process running
    BuildRunning,
    /// Driver exited successfully
    BuildSucceeded,
    /// Driver exited abnormally
    BuildFailed,
    /// Failure has been surfaced; nothing further will run
    Aborted,
}

impl BuildState {
    /// Get a human-readable description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::BuildRunning => "build running",
            Self::BuildSucceeded => "build succeeded",
            Self::BuildFailed => "build failed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Result of running the build driver once
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Artifacts the driver was asked to produce
    pub artifacts: Vec<PathBuf>,

    /// Whether the build succeeded
    pub success: bool,

    /// Process exit code (`None` if killed by a signal or never started)
    pub exit_code: Option<i32>,

    /// Build duration
    pub duration: Duration,

    /// Error message if failed
    pub error: Option<String>,

    /// Build output (stdout + stderr)
    pub output: String,
}

impl BuildResult {
    /// Create a successful build result
    #[must_use]
    pub const fn success(
        artifacts: Vec<PathBuf>,
        exit_code: Option<i32>,
        duration: Duration,
        output: String,
    ) -> Self {
        Self {
            artifacts,
            success: true,
            exit_code,
            duration,
            error: None,
            output,
        }
    }

    /// Create a failed build result
    #[must_use]
    pub const fn failure(
        artifacts: Vec<PathBuf>,
        exit_code: Option<i32>,
        duration: Duration,
        error: String,
        output: String,
    ) -> Self {
        Self {
            artifacts,
            success: false,
            exit_code,
            duration,
            error: Some(error),
            output,
        }
    }

    /// Exit code rendered for messages ("unknown" when absent)
    #[must_use]
    pub fn exit_code_display(&self) -> String {
        exit_code_text(self.exit_code)
    }
}

/// Render a process exit code ("unknown" when killed by a signal)
pub(crate) fn exit_code_text(code: Option<i32>) -> String {
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}

/// Everything the link step needs to produce one loadable module
///
/// Pure configuration: it is assembled once after the object build succeeds
/// and is never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionDescriptor {
    /// Module name, identical to the runtime's import identifier (e.g. `_jsonnet`)
    pub name: String,

    /// Glue sources compiled for this module
    pub sources: Vec<PathBuf>,

    /// Prebuilt objects passed to the linker as extra inputs
    pub extra_objects: Vec<PathBuf>,

    /// Language that drives the link
    pub language: LinkLanguage,

    /// Include directories for compiling the glue sources
    pub include_dirs: Vec<PathBuf>,

    /// Extra flags for compiling the glue sources
    pub extra_compile_args: Vec<String>,

    /// Extra flags for the final link
    pub extra_link_args: Vec<String>,

    /// Module file suffix (`.so`, `.cpython-312-x86_64-linux-gnu.so`)
    pub suffix: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Section {
        language: LinkLanguage,
    }

    fn parse_language(value: &str) -> Option<LinkLanguage> {
        toml::from_str::<Section>(&format!("language = \"{value}\""))
            .ok()
            .map(|s| s.language)
    }

    #[test]
    fn link_language_spellings_are_case_sensitive() {
        assert_eq!(parse_language("c"), Some(LinkLanguage::C));
        assert_eq!(parse_language("c++"), Some(LinkLanguage::Cxx));
        assert_eq!(parse_language("cxx"), Some(LinkLanguage::Cxx));
        assert_eq!(parse_language("cpp"), Some(LinkLanguage::Cxx));
        assert_eq!(parse_language("C++"), None);
        assert_eq!(parse_language("fortran"), None);
    }

    #[test]
    fn link_language_display_round_trips_config_spelling() {
        assert_eq!(LinkLanguage::Cxx.to_string(), "c++");
        assert_eq!(LinkLanguage::C.to_string(), "c");
    }

    #[test]
    fn failure_reports_unknown_exit_code() {
        let result = BuildResult::failure(
            vec![PathBuf::from("core/vm.o")],
            None,
            Duration::from_secs(0),
            "killed".to_string(),
            String::new(),
        );
        assert!(!result.success);
        assert_eq!(result.exit_code_display(), "unknown");
        assert_eq!(exit_code_text(Some(3)), "3");
    }
}
