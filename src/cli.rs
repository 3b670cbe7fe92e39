use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// File-backed installation pipeline tracker.
/// Storage defaults to ~/.pt/state.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "pt", version, about = "Installation pipeline tracker")]
pub struct Cli {
    /// Path to the installation state file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to the business model file.
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    /// Path to config.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level (overridden by PT_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
