// Chunk: docs/chunks/viewer_session - Headless viewer over the index and watcher
// Chunk: docs/chunks/cli - mdview command-line front end

//! mdview: find markdown files fast and keep the open one current.
//!
//! This crate ties the two workspace libraries together:
//!
//! - [`mdview_index`] discovers markdown files and ranks them against a
//!   partial name.
//! - [`mdview_watcher`] watches one file and re-attaches across
//!   delete/rename cycles.
//!
//! [`ViewerSession`] is the application state built on both, and
//! [`commands`] implements the `mdview` binary's subcommands.

pub mod commands;
pub mod config;
pub mod logging;
pub mod viewer;

pub use config::{ViewerConfig, CONFIG_FILE_NAME};
pub use viewer::{ViewerError, ViewerSession};

pub use mdview_index as index;
pub use mdview_watcher as watcher;
