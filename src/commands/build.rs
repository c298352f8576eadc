//! Build command
//!
//! Build the engine objects with the configured driver, then compile the
//! glue sources and link the extension module.

use super::Project;
use anyhow::Result;
use extbind::extensions::{ArtifactManifest, BuildDriver};
use extbind::{BuildResult, MakeDriver, PackageReport, Packager, SystemLinker};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Options for `extbind build`
#[derive(Debug)]
pub(crate) struct BuildOptions {
    pub(crate) skip_link: bool,
    pub(crate) out_dir: Option<PathBuf>,
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

/// Driver wrapper that shows a spinner while the build runs
#[derive(Debug)]
struct SpinnerDriver {
    inner: MakeDriver,
    show: bool,
}

impl BuildDriver for SpinnerDriver {
    fn build(&self, root: &Path, manifest: &ArtifactManifest) -> BuildResult {
        let spinner = self.show.then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(format!(
                "Building {} objects with {}...",
                manifest.len(),
                self.inner.program()
            ));
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });

        let result = self.inner.build(root, manifest);

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        result
    }

    fn describe(&self, manifest: &ArtifactManifest) -> String {
        self.inner.describe(manifest)
    }
}

/// Run the full pipeline
pub(crate) fn run(project: &Project, options: &BuildOptions) -> Result<()> {
    let (config, root) = project.load()?;

    let driver = SpinnerDriver {
        inner: MakeDriver::new(
            Some(config.build.driver.as_str()),
            config.build.args.clone(),
            options.verbose,
        ),
        show: !options.verbose && !options.quiet,
    };
    let linker = SystemLinker::new(options.verbose);

    let mut packager = Packager::new(&config, root).skip_link(options.skip_link);
    if let Some(out_dir) = &options.out_dir {
        packager = packager.with_out_dir(out_dir);
    }

    let report = packager.run(&driver, &linker)?;

    if !options.quiet {
        print_report(&report);
    }

    Ok(())
}

/// Build only the objects (version is still resolved first)
pub(crate) fn run_objects(project: &Project, verbose: bool, quiet: bool) -> Result<()> {
    run(
        project,
        &BuildOptions {
            skip_link: true,
            out_dir: None,
            verbose,
            quiet,
        },
    )
}

fn print_report(report: &PackageReport) {
    println!(
        "Built {} objects for {} {} in {:.2}s",
        report.descriptor.extra_objects.len(),
        report.metadata.name,
        report.metadata.version,
        report.build.duration.as_secs_f64()
    );

    match &report.extension {
        Some(path) => println!("Linked {} -> {}", report.descriptor.name, path.display()),
        None => println!("Skipped linking {}", report.descriptor.name),
    }
}
