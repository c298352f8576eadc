//! Describe command
//!
//! Show the package metadata and the extension descriptor without building

use super::Project;
use anyhow::Result;
use extbind::extensions::linker::module_file_name;
use extbind::{ExtensionDescriptor, PackageMetadata, Packager};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// JSON shape for `describe --json`
#[derive(Debug, Serialize)]
struct Description {
    package: PackageMetadata,
    extension: ExtensionDescriptor,
    output: PathBuf,
}

/// Print metadata and descriptor
pub(crate) fn run(project: &Project, json: bool) -> Result<()> {
    let (config, root) = project.load()?;
    let packager = Packager::new(&config, &root);

    // Version lookup failures are fatal here too
    let package = packager.metadata()?;
    let extension = packager.builder()?.describe();

    let output = Path::new(&config.extension.out_dir)
        .join(module_file_name(&extension.name, &extension.suffix));

    let description = Description {
        package,
        extension,
        output,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&description)?);
    } else {
        print_text(&description, &root);
    }

    Ok(())
}

fn print_text(description: &Description, root: &Path) {
    let package = &description.package;
    let extension = &description.extension;

    println!("{} {}", package.name, package.version);
    println!("  Homepage: {}", package.url);
    println!("  Summary: {}", package.description);
    println!("  Author: {} <{}>", package.author, package.author_email);
    println!("  Root: {}", root.display());
    println!();
    println!("Extension {} ({})", extension.name, extension.language);
    println!("  Output: {}", description.output.display());
    if !extension.include_dirs.is_empty() {
        println!("  Include dirs:");
        for dir in &extension.include_dirs {
            println!("    {}", dir.display());
        }
    }
    println!("  Sources:");
    for source in &extension.sources {
        println!("    {}", source.display());
    }
    println!("  Objects:");
    for object in &extension.extra_objects {
        println!("    {}", object.display());
    }
}
