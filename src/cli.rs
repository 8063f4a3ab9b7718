//! Command-line flags for the `contact-list` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::logging::Verbosity;

/// Terminal contact list backed by a local SQLite database.
#[derive(Debug, Parser)]
#[command(name = "contact-list")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a custom configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Database file to use instead of the configured one
    #[arg(short, long, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
