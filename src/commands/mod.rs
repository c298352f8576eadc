//! Command implementations

pub(crate) mod build;
pub(crate) mod completion;
pub(crate) mod describe;
pub(crate) mod version;

use anyhow::{Context, Result};
use extbind::Config;
use std::env;
use std::path::PathBuf;

/// Where the project lives, as given on the command line
#[derive(Debug)]
pub(crate) struct Project {
    /// `--manifest`
    pub(crate) manifest: Option<PathBuf>,
    /// `--root`
    pub(crate) root: Option<PathBuf>,
}

impl Project {
    /// Load the manifest and settle the project root.
    ///
    /// `--root` wins over the manifest's directory.
    pub(crate) fn load(&self) -> Result<(Config, PathBuf)> {
        let cwd = env::current_dir().context("Failed to determine current directory")?;
        let start = self
            .root
            .as_ref()
            .map_or_else(|| cwd.clone(), |r| extbind::paths::resolve_in(&cwd, r));

        let (config, discovered_root) = Config::discover(self.manifest.as_deref(), &start)?;
        let root = if self.root.is_some() {
            start
        } else {
            discovered_root
        };

        extbind::debug_log(&format!("Project root: {}", root.display()));
        Ok((config, root))
    }
}
