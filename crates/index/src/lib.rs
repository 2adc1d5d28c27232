// Chunk: docs/chunks/directory_indexer - Markdown file discovery
// Chunk: docs/chunks/fuzzy_matcher - Fuzzy path scoring
// Chunk: docs/chunks/quick_open - Live quick-open ranking and selection

//! mdview-index: find-fast half of mdview.
//!
//! This crate discovers markdown files under a directory and ranks them
//! against a partially typed name.
//!
//! # Overview
//!
//! - [`scan`] walks a directory once and returns sorted [`Candidate`]s.
//! - [`score`] is the greedy fuzzy scorer for one query/path pair.
//! - [`rank`] scores a candidate snapshot and returns the top
//!   [`MAX_RESULTS`] [`RankedResult`]s.
//! - [`QuickOpen`] keeps the query, results, and selection for an
//!   interactive picker.
//!
//! # Example
//!
//! ```
//! use std::path::{Path, PathBuf};
//! use mdview_index::{rank, Candidate};
//!
//! let base = Path::new("/notes");
//! let candidates = vec![
//!     Candidate::new(PathBuf::from("/notes/App.md"), base),
//!     Candidate::new(PathBuf::from("/notes/AppState.md"), base),
//! ];
//!
//! let results = rank(&candidates, "appst");
//! assert_eq!(results[0].candidate.relative_path, "AppState.md");
//! ```
//!
//! Everything here is synchronous and free of shared state, so any function
//! can be called from any thread.

mod directory_scanner;
mod error;
mod fuzzy;
mod natural_order;
mod quick_open;

pub use directory_scanner::{
    relative_path, scan, scan_with, try_scan, try_scan_with, Candidate, ScanOptions,
    MARKDOWN_EXTENSIONS, SKIPPED_DIRECTORIES,
};
pub use error::ScanError;
pub use fuzzy::score;
pub use natural_order::natural_cmp;
pub use quick_open::{rank, rank_with_limit, QuickOpen, RankedResult, MAX_RESULTS};
