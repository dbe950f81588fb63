//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(name = "qm", version, about = "Forum database normalizer")]
pub struct Cli {
    /// Path to the forum database.
    #[arg(long, global = true, env = "QUORUM_DB", default_value = "forum.db")]
    pub db: PathBuf,

    /// Emit machine-readable JSON on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output.
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the normalized schema in the target database.
    Init,

    /// Run the one-time legacy migration (bad_posts/bad_comments must be
    /// present in the target database).
    Migrate,

    /// Show row counts for the normalized tables.
    Status,

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
