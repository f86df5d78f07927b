//! Subcommand implementations.

use clap::ValueEnum;

pub mod explain;
pub mod fmt;
pub mod init;
pub mod validate;

/// How `validate` prints its report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One log line per finding.
    Text,
    /// The full result as JSON on stdout.
    Json,
}
