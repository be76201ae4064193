//! Console argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sdgs",
    version,
    about = "Operator console for regional poverty and unemployment indicators"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Store database file (in-memory store when omitted).
    #[arg(long, value_name = "PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Controller config as a JSON file.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Absolute directory for rolling log files (logging is off when omitted).
    #[arg(long = "log-dir", value_name = "DIR", global = true)]
    pub log_dir: Option<String>,

    /// trace|debug|info|warn|error (defaults by build mode).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Requested log level, or the build-mode default.
    pub fn effective_log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or(sdgs_core::default_log_level())
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Print core linkage info and exit.
    Ping,
    /// Read one command per stdin line and print each rebuilt view (default).
    Console,
}
