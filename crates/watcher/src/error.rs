//! Error types for file watching.

use std::path::PathBuf;

/// Errors reported by [`crate::FileWatcher::start`].
///
/// An open failure leaves the watcher `Stopped`; callers that want the
/// silent best-effort behaviour simply ignore it.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("cannot watch {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("watcher supervisor for {} has shut down", .0.display())]
    SupervisorGone(PathBuf),
}
