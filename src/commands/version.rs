//! Version command
//!
//! Print the package version resolved from the engine header

use super::Project;
use anyhow::Result;
use extbind::Packager;

/// Resolve and print the version
pub(crate) fn run(project: &Project) -> Result<()> {
    let (config, root) = project.load()?;
    let version = Packager::new(&config, root).resolve_version()?;
    println!("{version}");
    Ok(())
}
