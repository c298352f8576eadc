//! Environment variable handling.
//!
//! Toolchain variables follow the usual `make`/compiler conventions. The
//! `EXTBIND_*` variables mirror command-line flags.

use std::env;

// Helper for boolean environment variables that accept "1", "true", "yes"
fn is_enabled(var: &str) -> bool {
    env::var(var).ok().is_some_and(|s| {
        let s = s.to_lowercase();
        s == "1" || s == "true" || s == "yes"
    })
}

// Build tool configuration for native objects and the glue link step
// MAKE, CC, CXX, CFLAGS, CXXFLAGS, LDFLAGS

/// Get make command (overrides the manifest's build driver).
pub fn make_command() -> Option<String> {
    env::var("MAKE").ok().filter(|s| !s.trim().is_empty())
}

/// Get C compiler (useful for cross-compilation).
pub fn cc() -> Option<String> {
    env::var("CC").ok().filter(|s| !s.trim().is_empty())
}

/// Get C++ compiler (useful for cross-compilation).
pub fn cxx() -> Option<String> {
    env::var("CXX").ok().filter(|s| !s.trim().is_empty())
}

/// Get C compiler flags.
pub fn cflags() -> Option<String> {
    env::var("CFLAGS").ok()
}

/// Get C++ compiler flags.
pub fn cxxflags() -> Option<String> {
    env::var("CXXFLAGS").ok()
}

/// Get linker flags.
pub fn ldflags() -> Option<String> {
    env::var("LDFLAGS").ok()
}

// extbind settings

/// Get project manifest path (`extbind.toml` location override).
pub fn extbind_manifest() -> Option<String> {
    env::var("EXTBIND_MANIFEST").ok().filter(|s| !s.is_empty())
}

/// Check if debug logging is enabled.
pub fn extbind_debug() -> bool {
    is_enabled("EXTBIND_DEBUG")
}

/// Split a flags variable (`CFLAGS="-O2 -g"`) into individual arguments.
#[must_use]
pub fn split_flags(flags: &str) -> Vec<String> {
    flags.split_whitespace().map(ToString::to_string).collect()
}
