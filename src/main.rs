//! extbind command-line interface
//!
//! Builds an engine's native objects and links them into a loadable extension

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

/// Display an error with optional backtrace information
fn display_error(err: &anyhow::Error, backtrace_enabled: bool) {
    eprintln!("error: {err}");

    // Show error chain
    let mut source = err.source();
    while let Some(err) = source {
        eprintln!("caused by: {err}");
        source = err.source();
    }

    // Show captured toolchain output for build and link failures
    if let Some(output) = err
        .downcast_ref::<extbind::PackagingError>()
        .and_then(extbind::PackagingError::output)
    {
        eprintln!("\n{}", output.trim_end());
    }

    // Show backtrace if enabled
    if backtrace_enabled {
        let backtrace = err.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            eprintln!("\nBacktrace:");
            eprintln!("{backtrace}");
        }
    }
}

#[derive(Parser)]
#[command(name = "extbind")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build native engine objects and link them into a loadable extension", long_about = None)]
pub(crate) struct Cli {
    /// Path to the project manifest (defaults to the nearest extbind.toml)
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Project root (defaults to the manifest's directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Show backtrace on errors
    #[arg(long, global = true)]
    backtrace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the version resolved from the engine header
    Version,

    /// Build the engine objects and link the extension module
    Build {
        /// Stop after the object build and artifact check
        #[arg(long)]
        skip_link: bool,

        /// Output directory for the module (relative to the project root)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Show driver and compiler output
        #[arg(long)]
        verbose: bool,

        /// Suppress all output except errors
        #[arg(long, short, conflicts_with = "verbose")]
        quiet: bool,
    },

    /// Build only the engine objects and check they exist
    Objects {
        /// Show driver output
        #[arg(long)]
        verbose: bool,

        /// Suppress all output except errors
        #[arg(long, short, conflicts_with = "verbose")]
        quiet: bool,
    },

    /// Show package metadata and the extension descriptor
    Describe {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize debug mode
    extbind::init_debug(cli.debug);

    let project = commands::Project {
        manifest: cli.manifest,
        root: cli.root,
    };

    let result = match cli.command {
        Commands::Version => commands::version::run(&project),
        Commands::Build {
            skip_link,
            out_dir,
            verbose,
            quiet,
        } => commands::build::run(
            &project,
            &commands::build::BuildOptions {
                skip_link,
                out_dir,
                verbose,
                quiet,
            },
        ),
        Commands::Objects { verbose, quiet } => {
            commands::build::run_objects(&project, verbose, quiet)
        }
        Commands::Describe { json } => commands::describe::run(&project, json),
        Commands::Completion { shell } => commands::completion::run(shell),
    };

    if let Err(e) = result {
        // Display error with formatting
        display_error(&e, cli.backtrace);
        process::exit(1);
    }
}

mod commands;
