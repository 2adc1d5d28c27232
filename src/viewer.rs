// Chunk: docs/chunks/viewer_session - Headless viewer over the index and watcher
//!
//! The viewer's application state, without any rendering.
//!
//! A [`ViewerSession`] holds at most one open file and one current
//! directory. Opening a file reads it, starts a [`FileWatcher`] on it, and
//! scans its parent directory for quick-open candidates. Opening a directory
//! scans it, closes the current file, and shows the quick-open picker.
//!
//! # Change delivery
//!
//! The watcher callback runs on the watcher's own thread. It only forwards
//! the [`FileChange`] over a channel; the session owner drains that channel
//! with [`ViewerSession::process_changes`] or
//! [`ViewerSession::wait_for_change`] and the re-read happens there. This
//! keeps all session state on one thread and keeps the callback from ever
//! touching the watcher it belongs to.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use mdview_index::{scan_with, Candidate, QuickOpen, RankedResult};
use mdview_watcher::{FileChange, FileWatcher, WatchState};
use tracing::{debug, info};

use crate::config::ViewerConfig;

/// Title shown when nothing is open.
pub const DEFAULT_TITLE: &str = "mdview";

/// Errors from opening a path.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("cannot inspect {}: {source}", .path.display())]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Application state: the open file, the current directory, and quick open.
pub struct ViewerSession {
    /// Currently open file.
    file: Option<PathBuf>,
    /// Last content read from `file` (or an inline error document).
    content: String,
    /// Window title: the open file's name, or the directory's.
    title: String,
    /// Directory whose files are offered by quick open.
    directory: Option<PathBuf>,
    /// Configuration of `directory`.
    config: ViewerConfig,
    quick_open: QuickOpen,
    quick_open_visible: bool,
    /// Watcher on `file`. Replaced on every file open.
    watcher: Option<FileWatcher>,
    changes_tx: Sender<FileChange>,
    changes_rx: Receiver<FileChange>,
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerSession {
    /// Creates an empty session.
    pub fn new() -> Self {
        let (changes_tx, changes_rx) = mpsc::channel();
        let config = ViewerConfig::default();
        Self {
            file: None,
            content: String::new(),
            title: DEFAULT_TITLE.to_string(),
            directory: None,
            quick_open: QuickOpen::with_limit(Vec::new(), config.max_results()),
            config,
            quick_open_visible: false,
            watcher: None,
            changes_tx,
            changes_rx,
        }
    }

    // =========================================================================
    // Opening
    // =========================================================================

    /// Opens a file or a directory, whichever `path` is.
    pub fn open(&mut self, path: &Path) -> Result<(), ViewerError> {
        let metadata = std::fs::metadata(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ViewerError::NotFound(path.to_path_buf())
            } else {
                ViewerError::Inaccessible {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        if metadata.is_dir() {
            self.load_directory(&path);
        } else {
            self.load_file(&path, true);
        }
        Ok(())
    }

    /// Opens `path` as the current file and starts watching it.
    ///
    /// With `change_directory`, the parent directory becomes the current
    /// directory (and is scanned) if it differs from the current one.
    /// Quick-open selections pass `false` so the candidate list stays put.
    pub fn load_file(&mut self, path: &Path, change_directory: bool) {
        if change_directory {
            if let Some(parent) = path.parent() {
                if self.directory.as_deref() != Some(parent) {
                    self.set_directory(parent);
                }
            }
        }

        self.file = Some(path.to_path_buf());
        self.title = display_name(path);
        self.read_file();
        self.start_watching();
        info!("opened {}", path.display());
    }

    /// Makes `directory` current, closes the open file, and shows quick open.
    pub fn load_directory(&mut self, directory: &Path) {
        self.set_directory(directory);
        self.stop_watching();
        self.file = None;
        self.content.clear();
        self.title = display_name(directory);
        self.show_quick_open();
        info!("opened directory {}", directory.display());
    }

    /// Re-reads the open file.
    pub fn reload(&mut self) {
        self.read_file();
    }

    // =========================================================================
    // Quick open
    // =========================================================================

    /// Re-scans the current directory and shows the picker.
    pub fn show_quick_open(&mut self) {
        self.rescan();
        self.quick_open.set_query("");
        self.quick_open_visible = true;
    }

    pub fn hide_quick_open(&mut self) {
        self.quick_open_visible = false;
    }

    pub fn is_quick_open_visible(&self) -> bool {
        self.quick_open_visible
    }

    pub fn set_query(&mut self, query: &str) {
        self.quick_open.set_query(query);
    }

    pub fn select_next(&mut self) {
        self.quick_open.select_next();
    }

    pub fn select_previous(&mut self) {
        self.quick_open.select_previous();
    }

    /// Opens the selected result and hides the picker.
    ///
    /// Returns the opened path, or `None` when there is nothing selected.
    pub fn open_selected(&mut self) -> Option<PathBuf> {
        let path = self.quick_open.selected()?.candidate.path.clone();
        self.hide_quick_open();
        self.load_file(&path, false);
        Some(path)
    }

    pub fn results(&self) -> &[RankedResult] {
        self.quick_open.results()
    }

    pub fn quick_open(&self) -> &QuickOpen {
        &self.quick_open
    }

    /// Every candidate from the last scan.
    pub fn candidates(&self) -> &[Candidate] {
        self.quick_open.candidates()
    }

    // =========================================================================
    // Change processing
    // =========================================================================

    /// Re-reads the file if any change notifications are queued.
    ///
    /// Returns the number of notifications consumed.
    pub fn process_changes(&mut self) -> usize {
        let count = self.changes_rx.try_iter().count();
        if count > 0 {
            debug!("{count} change notification(s); re-reading");
            self.read_file();
        }
        count
    }

    /// Blocks up to `timeout` for a change notification, then re-reads.
    ///
    /// Notifications queued behind the first are folded into the same
    /// re-read. Returns the first notification, or `None` on timeout.
    pub fn wait_for_change(&mut self, timeout: Duration) -> Option<FileChange> {
        match self.changes_rx.recv_timeout(timeout) {
            Ok(change) => {
                let folded = self.changes_rx.try_iter().count();
                debug!(
                    "change {:?} (+{folded} queued) on {}",
                    change.kinds,
                    change.path.display()
                );
                self.read_file();
                Some(change)
            }
            // The session holds a sender, so the channel never disconnects
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// State of the watcher on the open file; `Stopped` when none is open.
    pub fn watch_state(&self) -> WatchState {
        self.watcher
            .as_ref()
            .map(FileWatcher::state)
            .unwrap_or(WatchState::Stopped)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn set_directory(&mut self, directory: &Path) {
        self.directory = Some(directory.to_path_buf());
        self.config = ViewerConfig::load(directory);
        self.quick_open = QuickOpen::with_limit(Vec::new(), self.config.max_results());
        self.rescan();
    }

    fn rescan(&mut self) {
        if let Some(directory) = &self.directory {
            let candidates = scan_with(directory, &self.config.scan_options());
            debug!(
                "{} candidate(s) under {}",
                candidates.len(),
                directory.display()
            );
            self.quick_open.set_candidates(candidates);
        }
    }

    fn read_file(&mut self) {
        let Some(path) = &self.file else {
            return;
        };
        self.content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                debug!("cannot read {}: {err}", path.display());
                format!("> **Error reading file:** {err}")
            }
        };
    }

    fn start_watching(&mut self) {
        self.stop_watching();
        let Some(path) = &self.file else {
            return;
        };

        // Anything still queued belongs to the previous file
        self.changes_rx.try_iter().for_each(drop);

        let tx = self.changes_tx.clone();
        let watcher = FileWatcher::with_options(
            path.clone(),
            self.config.watcher_options(),
            move |change: &FileChange| {
                let _ = tx.send(change.clone());
            },
        );
        if let Err(err) = watcher.start() {
            debug!("{err}");
        }
        self.watcher = Some(watcher);
    }

    fn stop_watching(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.stop();
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// =============================================================================
// Tests
// =============================================================================
