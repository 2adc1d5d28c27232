// Chunk: docs/chunks/resilient_file_watcher - Self-healing single-file watcher

//! mdview-watcher: watch-reliably half of mdview.
//!
//! Watches exactly one file and reports writes, deletes, renames, and
//! revocations through a callback. When the file is deleted or renamed
//! (editors that save atomically do both), the watcher waits briefly and
//! re-attaches to whatever now lives at the path, so the next save is
//! still observed.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::mpsc;
//! use mdview_watcher::{watch, FileChange};
//!
//! let (tx, rx) = mpsc::channel();
//! let watcher = watch("notes.md", move |change: &FileChange| {
//!     let _ = tx.send(change.kinds);
//! });
//!
//! for kinds in rx.iter().take(1) {
//!     println!("changed: {kinds:?}");
//! }
//! watcher.stop();
//! ```

mod error;
mod event;
mod file_watcher;
mod restart_debouncer;

pub use error::WatchError;
pub use event::{ChangeKinds, FileChange};
pub use file_watcher::{watch, ChangeCallback, FileWatcher, WatchState, WatcherOptions};
pub use restart_debouncer::{RestartDebouncer, DEFAULT_RESTART_DELAY_MS};
