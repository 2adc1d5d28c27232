// Chunk: docs/chunks/resilient_file_watcher - Self-healing single-file watcher
//!
//! A watcher for exactly one file that survives delete/rename cycles.
//!
//! # Architecture
//!
//! Each [`FileWatcher`] owns one supervisor thread. All watcher state lives
//! on that thread:
//!
//! - the current OS subscription (a non-recursive `notify` watch on the
//!   path itself),
//! - the session generation counter,
//! - the pending restart deadline ([`RestartDebouncer`]).
//!
//! `start`, `stop`, teardown, and backend events all arrive as messages on a
//! single channel, so they are processed one at a time and can never race.
//! `start` and `stop` wait for the supervisor's reply; when they return, the
//! transition has happened.
//!
//! # Session Lifecycle
//!
//! ```text
//!   Stopped --start ok--> Active --delete/rename/revoke--> PendingRestart
//!      ^                    ^                                    |
//!      |                    +------------ delay elapsed ---------+
//!      +------------ stop / drop (from any state) ---------------+
//! ```
//!
//! Every session is tagged with a generation. Events from an older
//! generation (queued before a stop or restart) are discarded, so a dropped
//! subscription can never fire the callback or resurrect the watcher.
//!
//! # Callback Contract
//!
//! The callback runs on the supervisor thread, once per delivered batch,
//! before the restart decision is made. It must not call `start`, `stop`, or
//! drop the watcher synchronously; hand the notification off to another
//! thread (a channel send is typical) and do the work there.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::error::WatchError;
use crate::event::{ChangeKinds, FileChange};
use crate::restart_debouncer::{RestartDebouncer, DEFAULT_RESTART_DELAY_MS};

/// Type alias for the change callback.
///
/// Invoked on the supervisor thread with the watched path and the kinds of
/// change seen in the batch.
pub type ChangeCallback = Box<dyn Fn(&FileChange) + Send + Sync>;

/// Lifecycle state of a watcher's OS subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// No subscription and no restart pending.
    Stopped,
    /// Subscribed to the path.
    Active,
    /// The path went away; a restart is scheduled.
    PendingRestart,
}

/// Tuning knobs for a [`FileWatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherOptions {
    /// Delay between a delete/rename/revoke and the re-open attempt.
    pub restart_delay: Duration,
    /// Keep retrying, every `restart_delay`, when the path cannot be opened.
    ///
    /// Off by default: a failed open leaves the watcher `Stopped`.
    pub retry_while_missing: bool,
}

impl Default for WatcherOptions {
    fn default() -> Self {
        Self {
            restart_delay: Duration::from_millis(DEFAULT_RESTART_DELAY_MS),
            retry_while_missing: false,
        }
    }
}

/// Messages processed by the supervisor thread.
enum Message {
    Start(Sender<Result<(), WatchError>>),
    Stop(Sender<()>),
    Backend {
        generation: u64,
        result: notify::Result<Event>,
    },
    Shutdown,
}

/// Watches a single file and re-attaches across delete/rename cycles.
pub struct FileWatcher {
    /// The watched path.
    path: PathBuf,
    /// Channel into the supervisor thread.
    tx: Sender<Message>,
    /// Last state published by the supervisor.
    state: Arc<Mutex<WatchState>>,
    /// Supervisor thread (joined on drop).
    supervisor: Option<JoinHandle<()>>,
}

impl FileWatcher {
    /// Creates a stopped watcher for `path` with default options.
    ///
    /// Nothing is watched until [`start`](Self::start) is called.
    pub fn new<F>(path: impl Into<PathBuf>, on_change: F) -> Self
    where
        F: Fn(&FileChange) + Send + Sync + 'static,
    {
        Self::with_options(path, WatcherOptions::default(), on_change)
    }

    /// Creates a stopped watcher for `path` with custom options.
    pub fn with_options<F>(path: impl Into<PathBuf>, options: WatcherOptions, on_change: F) -> Self
    where
        F: Fn(&FileChange) + Send + Sync + 'static,
    {
        let path = path.into();
        let (tx, rx) = mpsc::channel::<Message>();
        let state = Arc::new(Mutex::new(WatchState::Stopped));

        let supervisor = Supervisor {
            path: path.clone(),
            options,
            on_change: Box::new(on_change),
            tx: tx.clone(),
            session: None,
            generation: 0,
            restart: RestartDebouncer::new(options.restart_delay),
            state: Arc::clone(&state),
            backlog: VecDeque::new(),
        };

        let handle = thread::Builder::new()
            .name("mdview-file-watcher".to_string())
            .spawn(move || supervisor.run(rx))
            .ok();
        if handle.is_none() {
            warn!("failed to spawn watcher thread for {}", path.display());
        }

        Self {
            path,
            tx,
            state,
            supervisor: handle,
        }
    }

    /// Starts (or restarts) watching.
    ///
    /// Any existing session is stopped first. If the path cannot be opened
    /// the watcher stays `Stopped` (or `PendingRestart` with
    /// `retry_while_missing`) and the error is returned for the caller to
    /// act on or ignore.
    pub fn start(&self) -> Result<(), WatchError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(Message::Start(reply_tx))
            .map_err(|_| WatchError::SupervisorGone(self.path.clone()))?;
        reply_rx
            .recv()
            .map_err(|_| WatchError::SupervisorGone(self.path.clone()))?
    }

    /// Stops watching and cancels any pending restart.
    ///
    /// Safe to call repeatedly and on a watcher that was never started.
    pub fn stop(&self) {
        let (reply_tx, reply_rx) = mpsc::channel();
        if self.tx.send(Message::Stop(reply_tx)).is_ok() {
            let _ = reply_rx.recv();
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> WatchState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The watched path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        // Shutdown stops the session and cancels the restart before the
        // thread exits.
        let _ = self.tx.send(Message::Shutdown);
        if let Some(handle) = self.supervisor.take() {
            let _ = handle.join();
        }
    }
}

/// Creates a watcher for `path` and starts it.
///
/// A failed open is logged and otherwise ignored; the returned watcher is
/// then `Stopped`.
pub fn watch<F>(path: impl Into<PathBuf>, on_change: F) -> FileWatcher
where
    F: Fn(&FileChange) + Send + Sync + 'static,
{
    let watcher = FileWatcher::new(path, on_change);
    if let Err(err) = watcher.start() {
        debug!("{err}");
    }
    watcher
}

// =============================================================================
// Supervisor
// =============================================================================

/// A live OS subscription.
struct WatchSession {
    generation: u64,
    /// Dropping the backend watcher removes the OS watch.
    _watcher: RecommendedWatcher,
}

/// Owns all mutable watcher state; runs on the supervisor thread.
struct Supervisor {
    path: PathBuf,
    options: WatcherOptions,
    on_change: ChangeCallback,
    /// Cloned into each backend watcher's event handler.
    tx: Sender<Message>,
    session: Option<WatchSession>,
    generation: u64,
    restart: RestartDebouncer,
    state: Arc<Mutex<WatchState>>,
    /// Messages pulled off the channel while draining a batch.
    backlog: VecDeque<Message>,
}

impl Supervisor {
    fn run(mut self, rx: Receiver<Message>) {
        loop {
            let message = match self.next_message(&rx) {
                Some(message) => message,
                None => break,
            };

            match message {
                Some(Message::Start(reply)) => {
                    let result = self.start_session();
                    let _ = reply.send(result);
                }
                Some(Message::Stop(reply)) => {
                    self.stop_session();
                    let _ = reply.send(());
                }
                Some(Message::Backend { generation, result }) => {
                    self.handle_backend(generation, result, &rx);
                }
                Some(Message::Shutdown) => {
                    self.stop_session();
                    break;
                }
                // Woke up for the restart deadline
                None => {}
            }

            self.fire_restart_if_due();
        }
        debug!("watcher supervisor for {} exiting", self.path.display());
    }

    /// Waits for the next message, or for the restart deadline.
    ///
    /// Returns `None` when the channel is closed, `Some(None)` on a deadline
    /// wake-up.
    fn next_message(&mut self, rx: &Receiver<Message>) -> Option<Option<Message>> {
        if let Some(message) = self.backlog.pop_front() {
            return Some(Some(message));
        }

        match self.restart.time_remaining(Instant::now()) {
            Some(wait) => match rx.recv_timeout(wait) {
                Ok(message) => Some(Some(message)),
                Err(RecvTimeoutError::Timeout) => Some(None),
                Err(RecvTimeoutError::Disconnected) => None,
            },
            None => rx.recv().ok().map(Some),
        }
    }

    fn set_state(&self, state: WatchState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Opens a fresh subscription, replacing any existing one.
    fn start_session(&mut self) -> Result<(), WatchError> {
        self.stop_session();

        self.generation += 1;
        let generation = self.generation;

        match self.open(generation) {
            Ok(watcher) => {
                self.session = Some(WatchSession {
                    generation,
                    _watcher: watcher,
                });
                self.set_state(WatchState::Active);
                debug!("watching {} (session {generation})", self.path.display());
                Ok(())
            }
            Err(err) => {
                if self.options.retry_while_missing {
                    self.restart.schedule(Instant::now());
                    self.set_state(WatchState::PendingRestart);
                    debug!("{err}; retrying in {:?}", self.options.restart_delay);
                } else {
                    debug!("{err}; watcher stays stopped");
                }
                Err(err)
            }
        }
    }

    fn open(&self, generation: u64) -> Result<RecommendedWatcher, WatchError> {
        let tx = self.tx.clone();
        let open_error = |source| WatchError::Open {
            path: self.path.clone(),
            source,
        };

        let mut watcher = RecommendedWatcher::new(
            move |result: notify::Result<Event>| {
                let _ = tx.send(Message::Backend { generation, result });
            },
            Config::default(),
        )
        .map_err(open_error)?;

        watcher
            .watch(&self.path, RecursiveMode::NonRecursive)
            .map_err(open_error)?;

        Ok(watcher)
    }

    /// Drops the subscription and cancels any pending restart.
    fn stop_session(&mut self) {
        self.restart.cancel();
        if let Some(session) = self.session.take() {
            debug!(
                "stopped watching {} (session {})",
                self.path.display(),
                session.generation
            );
        }
        self.set_state(WatchState::Stopped);
    }

    /// Handles one backend event plus any already-queued events from the
    /// same session, as a single batch.
    fn handle_backend(
        &mut self,
        generation: u64,
        result: notify::Result<Event>,
        rx: &Receiver<Message>,
    ) {
        let current = self.session.as_ref().map(|session| session.generation);
        if current != Some(generation) {
            debug!("dropping event from stale session {generation}");
            return;
        }

        let mut kinds = classify(&result);

        coalesce_queued(rx, generation, &mut kinds, &mut self.backlog);

        if kinds.is_empty() {
            return;
        }

        (self.on_change)(&FileChange {
            path: self.path.clone(),
            kinds,
        });

        if kinds.requires_restart() {
            self.restart.schedule(Instant::now());
            self.set_state(WatchState::PendingRestart);
            info!(
                "{} went away ({kinds:?}); restarting in {:?}",
                self.path.display(),
                self.options.restart_delay
            );
        }
    }

    fn fire_restart_if_due(&mut self) {
        if self.restart.fire_if_ready(Instant::now()) {
            debug!("restarting watch on {}", self.path.display());
            // Failure is logged inside start_session; the retry policy decides
            // whether another attempt is scheduled.
            let _ = self.start_session();
        }
    }
}

/// Upper bound on events merged into one batch.
const MAX_BATCH_EVENTS: usize = 64;

/// Merges already-queued events of `generation` into `kinds`.
///
/// Stops at the first other message (kept in `backlog` so it is handled
/// next, in order), at an empty channel, or after [`MAX_BATCH_EVENTS`].
/// Does nothing while `backlog` is non-empty, since queued events would then
/// overtake older messages. Returns the number of events merged.
fn coalesce_queued(
    rx: &Receiver<Message>,
    generation: u64,
    kinds: &mut ChangeKinds,
    backlog: &mut VecDeque<Message>,
) -> usize {
    if !backlog.is_empty() {
        return 0;
    }

    let mut merged = 0;
    while merged < MAX_BATCH_EVENTS {
        match rx.try_recv() {
            Ok(Message::Backend {
                generation: next,
                result,
            }) if next == generation => {
                kinds.merge(classify(&result));
                merged += 1;
            }
            Ok(other) => {
                backlog.push_back(other);
                break;
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
        }
    }
    merged
}

fn classify(result: &notify::Result<Event>) -> ChangeKinds {
    match result {
        Ok(event) => ChangeKinds::from_event(event),
        Err(err) => {
            let kinds = ChangeKinds::from_error(err);
            if kinds.is_empty() {
                warn!("file watcher error: {err}");
            }
            kinds
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn counting_watcher(path: &Path) -> (FileWatcher, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let watcher = FileWatcher::new(path, move |_change: &FileChange| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (watcher, count)
    }

    #[test]
    fn test_new_watcher_is_stopped() {
        let temp = TempDir::new().unwrap();
        let (watcher, count) = counting_watcher(&temp.path().join("a.md"));
        assert_eq!(watcher.state(), WatchState::Stopped);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stop_never_started_is_noop() {
        let temp = TempDir::new().unwrap();
        let (watcher, _count) = counting_watcher(&temp.path().join("a.md"));
        watcher.stop();
        watcher.stop();
        assert_eq!(watcher.state(), WatchState::Stopped);
    }

    #[test]
    fn test_start_missing_file_stays_stopped() {
        let temp = TempDir::new().unwrap();
        let (watcher, _count) = counting_watcher(&temp.path().join("missing.md"));

        let err = watcher.start().unwrap_err();
        assert!(matches!(err, WatchError::Open { .. }));
        assert_eq!(watcher.state(), WatchState::Stopped);
    }

    #[test]
    fn test_start_existing_file_is_active() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.md");
        fs::write(&file, "# a").unwrap();

        let (watcher, _count) = counting_watcher(&file);
        watcher.start().unwrap();
        assert_eq!(watcher.state(), WatchState::Active);

        watcher.stop();
        assert_eq!(watcher.state(), WatchState::Stopped);
    }

    #[test]
    fn test_start_twice_keeps_single_session() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.md");
        fs::write(&file, "# a").unwrap();

        let (watcher, _count) = counting_watcher(&file);
        watcher.start().unwrap();
        watcher.start().unwrap();
        assert_eq!(watcher.state(), WatchState::Active);
    }

    #[test]
    fn test_retry_option_leaves_restart_pending() {
        let temp = TempDir::new().unwrap();
        let options = WatcherOptions {
            restart_delay: Duration::from_secs(60),
            retry_while_missing: true,
        };
        let watcher = FileWatcher::with_options(
            temp.path().join("later.md"),
            options,
            |_change: &FileChange| {},
        );

        assert!(watcher.start().is_err());
        assert_eq!(watcher.state(), WatchState::PendingRestart);

        watcher.stop();
        assert_eq!(watcher.state(), WatchState::Stopped);
    }

    #[test]
    fn test_drop_joins_supervisor() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.md");
        fs::write(&file, "# a").unwrap();

        let (watcher, _count) = counting_watcher(&file);
        watcher.start().unwrap();
        // Must return promptly rather than hang
        drop(watcher);
    }

    // -------------------------------------------------------------------------
    // Batch coalescing
    // -------------------------------------------------------------------------

    fn write_event(generation: u64) -> Message {
        use notify::event::{DataChange, ModifyKind};
        use notify::EventKind;
        Message::Backend {
            generation,
            result: Ok(Event::new(EventKind::Modify(ModifyKind::Data(
                DataChange::Content,
            )))),
        }
    }

    #[test]
    fn test_coalesce_is_capped() {
        let (tx, rx) = mpsc::channel();
        for _ in 0..MAX_BATCH_EVENTS + 10 {
            tx.send(write_event(1)).unwrap();
        }

        let mut kinds = ChangeKinds::default();
        let mut backlog = VecDeque::new();
        let merged = coalesce_queued(&rx, 1, &mut kinds, &mut backlog);

        assert_eq!(merged, MAX_BATCH_EVENTS);
        assert!(kinds.write);
        assert!(backlog.is_empty());
        assert_eq!(rx.try_iter().count(), 10);
    }

    #[test]
    fn test_coalesce_stops_at_first_other_message() {
        let (tx, rx) = mpsc::channel();
        let (reply_tx, _reply_rx) = mpsc::channel();
        tx.send(write_event(1)).unwrap();
        tx.send(Message::Stop(reply_tx)).unwrap();
        tx.send(write_event(1)).unwrap();

        let mut kinds = ChangeKinds::default();
        let mut backlog = VecDeque::new();
        let merged = coalesce_queued(&rx, 1, &mut kinds, &mut backlog);

        assert_eq!(merged, 1);
        assert_eq!(backlog.len(), 1);
        assert!(matches!(backlog.front(), Some(Message::Stop(_))));
        // The event behind the stop stays queued for after it
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn test_coalesce_leaves_other_generations_for_main_loop() {
        let (tx, rx) = mpsc::channel();
        tx.send(write_event(2)).unwrap();

        let mut kinds = ChangeKinds::default();
        let mut backlog = VecDeque::new();
        assert_eq!(coalesce_queued(&rx, 1, &mut kinds, &mut backlog), 0);
        assert!(kinds.is_empty());
        assert_eq!(backlog.len(), 1);
    }

    #[test]
    fn test_coalesce_skipped_while_backlog_pending() {
        let (tx, rx) = mpsc::channel();
        tx.send(write_event(1)).unwrap();

        let mut kinds = ChangeKinds::default();
        let mut backlog = VecDeque::from([Message::Shutdown]);
        assert_eq!(coalesce_queued(&rx, 1, &mut kinds, &mut backlog), 0);
        assert_eq!(backlog.len(), 1);
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn test_default_options() {
        let options = WatcherOptions::default();
        assert_eq!(options.restart_delay, Duration::from_millis(150));
        assert!(!options.retry_while_missing);
    }
}
