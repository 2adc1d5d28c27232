// Chunk: docs/chunks/cli - mdview command-line front end

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Find markdown files fast and follow them as they change on disk.
///
/// mdview lists the markdown files under a directory, ranks them against a
/// partially typed name, and keeps an open file's content current across
/// external edits, atomic saves, and delete/recreate cycles.
#[derive(Parser, Debug)]
#[command(
    name = "mdview",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every markdown file under a directory, in display order.
    Scan {
        /// Directory to scan.
        dir: PathBuf,

        /// Output results as JSON instead of one path per line.
        #[arg(long)]
        json: bool,
    },

    /// Rank the markdown files under a directory against a fuzzy query.
    Find {
        /// Directory to scan.
        dir: PathBuf,

        /// Partial file name (e.g. "rdme" or "guide/inst").
        query: String,

        /// Maximum number of results (defaults to mdview.toml or 20).
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Open a file or directory the way the viewer does.
    ///
    /// A file is read, watched, and its directory scanned. A directory is
    /// scanned and its quick-open list printed.
    Open {
        /// Markdown file or directory.
        path: PathBuf,

        /// Quick-open query to apply to the directory listing.
        #[arg(short, long)]
        query: Option<String>,

        /// Keep running and report every reload of the open file.
        #[arg(short, long)]
        follow: bool,

        /// Exit after this many reloads (implies --follow).
        #[arg(long)]
        max_reloads: Option<usize>,
    },
}
