//! Build driver invocation
//!
//! Runs the external build tool with the declared objects as explicit
//! targets. It's the equivalent of:
//! ```bash
//! cd <project root>
//! make core/libjsonnet.o core/lexer.o core/parser.o core/static_analysis.o core/vm.o
//! ```

use super::manifest::ArtifactManifest;
use super::types::BuildResult;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

/// Default build driver program
pub const DEFAULT_DRIVER: &str = "make";

/// Something that can produce the declared object artifacts
///
/// Implementations block until the build finishes. There is no timeout and
/// no cancellation.
pub trait BuildDriver {
    /// Build every object in `manifest`, with `root` as the working directory
    fn build(&self, root: &Path, manifest: &ArtifactManifest) -> BuildResult;

    /// Human-readable command line, for logs
    fn describe(&self, manifest: &ArtifactManifest) -> String;
}

/// `make`-style driver: `<program> [args...] <targets...>`
#[derive(Debug, Clone)]
pub struct MakeDriver {
    /// Driver executable
    program: String,
    /// Arguments placed before the targets
    args: Vec<String>,
    /// Echo driver output as it is captured
    verbose: bool,
}

impl MakeDriver {
    /// Create a driver.
    ///
    /// Priority order for the program:
    /// 1. MAKE environment variable
    /// 2. `configured` (the manifest's `build.driver`)
    /// 3. `make`
    #[must_use]
    pub fn new(configured: Option<&str>, args: Vec<String>, verbose: bool) -> Self {
        let program = crate::env_vars::make_command()
            .or_else(|| configured.map(ToString::to_string))
            .unwrap_or_else(|| DEFAULT_DRIVER.to_string());

        Self {
            program,
            args,
            verbose,
        }
    }

    /// Driver executable
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, root: &Path, manifest: &ArtifactManifest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.args(manifest.objects());
        cmd.current_dir(root);

        // Pass build tool environment variables to the driver
        // These override what's in the Makefile if needed
        if let Some(cc) = crate::env_vars::cc() {
            cmd.env("CC", cc);
        }
        if let Some(cxx) = crate::env_vars::cxx() {
            cmd.env("CXX", cxx);
        }
        if let Some(cflags) = crate::env_vars::cflags() {
            cmd.env("CFLAGS", cflags);
        }
        if let Some(cxxflags) = crate::env_vars::cxxflags() {
            cmd.env("CXXFLAGS", cxxflags);
        }
        if let Some(ldflags) = crate::env_vars::ldflags() {
            cmd.env("LDFLAGS", ldflags);
        }

        cmd
    }
}

impl BuildDriver for MakeDriver {
    fn build(&self, root: &Path, manifest: &ArtifactManifest) -> BuildResult {
        let start_time = Instant::now();
        let artifacts = manifest.objects().to_vec();

        let command_line = self.describe(manifest);
        crate::debug!("Running {command_line} in {}", root.display());
        if self.verbose {
            println!("  Running: {command_line}");
        }

        let output = match self.command(root, manifest).output() {
            Ok(out) => out,
            Err(e) => {
                return BuildResult::failure(
                    artifacts,
                    None,
                    start_time.elapsed(),
                    format!("Failed to run {}: {e}", self.program),
                    String::new(),
                );
            }
        };

        let mut captured = String::new();
        captured.push_str(&String::from_utf8_lossy(&output.stdout));
        captured.push_str(&String::from_utf8_lossy(&output.stderr));

        if self.verbose && !captured.trim().is_empty() {
            print!("{captured}");
        }

        let exit_code = output.status.code();
        if output.status.success() {
            return BuildResult::success(artifacts, exit_code, start_time.elapsed(), captured);
        }

        let mut result =
            BuildResult::failure(artifacts, exit_code, start_time.elapsed(), String::new(), captured);
        result.error = Some(format!(
            "{} failed with exit code: {}",
            self.program,
            result.exit_code_display()
        ));
        result
    }

    fn describe(&self, manifest: &ArtifactManifest) -> String {
        let mut parts = Vec::with_capacity(1 + self.args.len() + manifest.len());
        parts.push(self.program.clone());
        parts.extend(self.args.iter().cloned());
        parts.extend(manifest.objects().iter().map(|o| o.display().to_string()));
        parts.join(" ")
    }
}
