//! Host runtime configuration
//!
//! The glue source includes the runtime's own headers (`Python.h`) and the
//! module must carry the suffix the runtime imports. Both come from the
//! runtime's config tool:
//! ```bash
//! python3-config --includes          # -I/usr/include/python3.12 ...
//! python3-config --extension-suffix  # .cpython-312-x86_64-linux-gnu.so
//! ```

use super::types::exit_code_text;
use crate::package::PackagingError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Default runtime config tool
pub const DEFAULT_RUNTIME_CONFIG: &str = "python3-config";

/// Settings reported by the runtime config tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Header directories (`-I` entries of `--includes`)
    pub include_dirs: Vec<PathBuf>,
    /// Any other flags `--includes` printed
    pub compile_args: Vec<String>,
    /// Module suffix from `--extension-suffix`, if the tool printed one
    pub extension_suffix: Option<String>,
}

impl RuntimeConfig {
    /// Run `program --includes` and `program --extension-suffix` in `root`.
    ///
    /// # Errors
    ///
    /// Returns `PackagingError::Configuration` if the tool cannot be run or
    /// exits unsuccessfully.
    pub fn query(program: &str, root: &Path) -> Result<Self, PackagingError> {
        let includes = run_query(program, "--includes", root)?;
        let suffix = run_query(program, "--extension-suffix", root)?;

        let mut config = Self::parse_includes(&includes);
        config.extension_suffix = Some(suffix.trim().to_string()).filter(|s| !s.is_empty());

        crate::debug!(
            "Runtime config from {program}: {} include dirs, suffix {:?}",
            config.include_dirs.len(),
            config.extension_suffix
        );

        Ok(config)
    }

    /// Split `--includes` output into include dirs and other flags.
    ///
    /// Repeated directories are kept once, in first-seen order.
    #[must_use]
    pub fn parse_includes(output: &str) -> Self {
        let mut config = Self::default();
        for flag in crate::env_vars::split_flags(output) {
            match flag.strip_prefix("-I") {
                Some(dir) if !dir.is_empty() => {
                    let dir = PathBuf::from(dir);
                    if !config.include_dirs.contains(&dir) {
                        config.include_dirs.push(dir);
                    }
                }
                _ => config.compile_args.push(flag),
            }
        }
        config
    }
}

fn run_query(program: &str, flag: &str, root: &Path) -> Result<String, PackagingError> {
    let output = Command::new(program)
        .arg(flag)
        .current_dir(root)
        .output()
        .map_err(|e| PackagingError::Configuration {
            message: format!("Failed to run runtime config {program} {flag}: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PackagingError::Configuration {
            message: format!(
                "Runtime config {program} {flag} failed with exit code: {}{}",
                exit_code_text(output.status.code()),
                if stderr.trim().is_empty() {
                    String::new()
                } else {
                    format!(" ({})", stderr.trim())
                }
            ),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
