//! Classification of raw `notify` events into the watcher's event mask.
//!
//! The watcher subscribes to four kinds of change: write, delete, rename,
//! and revoke. Everything else the backend reports (opens, reads,
//! attribute-only changes) is outside the mask and never reaches the
//! callback.

use std::path::PathBuf;

use notify::event::{AccessKind, AccessMode, ModifyKind};
use notify::{Event, EventKind};

/// The set of change kinds observed in one delivered batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeKinds {
    /// File content was written.
    pub write: bool,
    /// File was deleted.
    pub delete: bool,
    /// File was renamed or moved.
    pub rename: bool,
    /// The OS-level watch is no longer valid (unmount, watch dropped).
    pub revoke: bool,
}

impl ChangeKinds {
    /// Only `write` set.
    pub fn write() -> Self {
        Self {
            write: true,
            ..Self::default()
        }
    }

    /// Only `delete` set.
    pub fn delete() -> Self {
        Self {
            delete: true,
            ..Self::default()
        }
    }

    /// Only `rename` set.
    pub fn rename() -> Self {
        Self {
            rename: true,
            ..Self::default()
        }
    }

    /// Only `revoke` set.
    pub fn revoke() -> Self {
        Self {
            revoke: true,
            ..Self::default()
        }
    }

    /// True if no kind is set (the event was outside the mask).
    pub fn is_empty(&self) -> bool {
        !(self.write || self.delete || self.rename || self.revoke)
    }

    /// True if the current OS handle is gone and the watch must be re-opened.
    pub fn requires_restart(&self) -> bool {
        self.delete || self.rename || self.revoke
    }

    /// Adds every kind set in `other`.
    pub fn merge(&mut self, other: ChangeKinds) {
        self.write |= other.write;
        self.delete |= other.delete;
        self.rename |= other.rename;
        self.revoke |= other.revoke;
    }

    /// Maps a backend event onto the mask.
    pub fn from_event(event: &Event) -> Self {
        if event.need_rescan() {
            // The backend lost events; assume the content changed.
            return Self::write();
        }

        match &event.kind {
            EventKind::Create(_) => Self::write(),
            EventKind::Modify(ModifyKind::Name(_)) => Self::rename(),
            EventKind::Modify(ModifyKind::Metadata(_)) => Self::default(),
            EventKind::Modify(_) => Self::write(),
            EventKind::Access(AccessKind::Close(AccessMode::Write)) => Self::write(),
            EventKind::Access(_) => Self::default(),
            EventKind::Remove(_) => Self::delete(),
            EventKind::Any => Self::write(),
            EventKind::Other => Self::default(),
        }
    }

    /// Maps a backend error onto the mask.
    ///
    /// A vanished path or watch means the handle was revoked. Other errors
    /// carry no information about the file and map to nothing.
    pub fn from_error(error: &notify::Error) -> Self {
        match error.kind {
            notify::ErrorKind::PathNotFound | notify::ErrorKind::WatchNotFound => Self::revoke(),
            _ => Self::default(),
        }
    }
}

/// What the change callback receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// The watched path (as given to the watcher, not as reported by the OS).
    pub path: PathBuf,
    /// Every kind of change seen in this batch.
    pub kinds: ChangeKinds,
}
