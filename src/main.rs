// Chunk: docs/chunks/cli - mdview command-line front end
//!
//! mdview: find markdown files fast and follow them as they change on disk.

mod cli;

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use cli::{Cli, Commands};
use mdview::commands::{self, OpenOptions};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = mdview::logging::init();
    debug!("mdview {} starting", env!("CARGO_PKG_VERSION"));

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Scan { dir, json } => commands::scan(&dir, json, &mut out)?,
        Commands::Find {
            dir,
            query,
            limit,
            json,
        } => commands::find(&dir, &query, limit, json, &mut out)?,
        Commands::Open {
            path,
            query,
            follow,
            max_reloads,
        } => {
            let options = OpenOptions {
                query,
                follow,
                max_reloads,
            };
            commands::open(&path, &options, &mut out)?;
        }
    }

    Ok(())
}
