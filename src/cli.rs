use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Project and task tracker backed by a local JSON snapshot.
/// Data lives in ~/.taskboard unless --dir or TASKBOARD_DIR says otherwise.
#[derive(Parser)]
#[command(name = "tb", version, about = "Project and task tracker")]
pub struct Cli {
    /// Data directory holding the snapshot and config.toml.
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Log store activity to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
