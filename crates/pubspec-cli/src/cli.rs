//! Command line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Check, format and convert pubspec.yaml files
#[derive(Parser, Debug)]
#[command(name = "pubspec", version, about = "Check, format and convert pubspec.yaml files")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Load and validate pubspec.yaml, then print a summary of each section
    Check {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Rewrite pubspec.yaml in canonical form
    Fmt {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Always write third-party hosted dependencies as `hosted: {name, url}`
        #[arg(long)]
        qualified_hosted: bool,

        /// Print the formatted document instead of writing it
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Print pubspec.yaml as JSON
    Json {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Always write third-party hosted dependencies as `hosted: {name, url}`
        #[arg(long)]
        qualified_hosted: bool,
    },
}
