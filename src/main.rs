//! # tb - Taskboard CLI
//!
//! Command-line front end for the taskboard store: projects with timelines and
//! teams, tasks nested under parent tasks, list reordering and per-project
//! statistics.
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a project
//! tb project add "Website Redesign" --desc "New landing page" --start 2024-01-15 --end 2024-03-15
//!
//! # Add a task and a subtask
//! tb task add <project-id> "Design homepage"
//! tb task add <project-id> "Header component" --parent <task-id>
//!
//! # Show the tree and the numbers
//! tb task tree <project-id>
//! tb stats <project-id>
//! ```
//!
//! Data is stored in `~/.taskboard/taskboard.json` (override with `--dir` or
//! `TASKBOARD_DIR`). An optional `config.toml` next to it sets the delete policy,
//! demo seeding and log format.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use taskboard::config::{resolve_data_dir, Config, LogFormat};
use taskboard::{seed, JsonFileStore, SaveStatus, Store};

mod cli;
mod cmd;

use cli::Cli;
use cmd::{cmd_completions, dispatch, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let dir = resolve_data_dir(cli.dir.as_deref());
    fs::create_dir_all(&dir).with_context(|| format!("creating data directory {}", dir.display()))?;
    let config = Config::load(&dir)?;
    init_logging(cli.verbose, config.log_format);

    let mut store = open_store(&dir, &config)?;
    dispatch(&mut store, cli.command)?;

    if let SaveStatus::Unsaved(reason) = store.save_status() {
        bail!("changes were applied but not saved: {reason}");
    }
    Ok(())
}

fn open_store(dir: &Path, config: &Config) -> Result<Store> {
    let path = config.data_path(dir);
    let fresh = !path.exists();
    let mut store = Store::open(JsonFileStore::new(&path))
        .with_context(|| format!("loading {}", path.display()))?
        .with_delete_policy(config.delete_policy);
    if fresh && config.seed_demo_data {
        let now = store.now();
        store.replace(seed::demo_snapshot(now));
        info!(path = %path.display(), "seeded demo data");
    }
    Ok(store)
}

fn init_logging(verbose: bool, format: LogFormat) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("TASKBOARD_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => {
            registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
        }
        LogFormat::Compact => {
            registry.with(fmt::layer().compact().with_writer(std::io::stderr)).init();
        }
    }
}
