//! Error types for directory scanning.

use std::path::PathBuf;

/// Errors reported by [`crate::try_scan`].
///
/// Only the root directory can fail a scan. Problems with individual entries
/// (permission denied, deleted mid-walk) are skipped, never reported.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("cannot read directory {}: {source}", .path.display())]
    UnreadableRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}
