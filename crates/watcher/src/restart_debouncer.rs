// Chunk: docs/chunks/resilient_file_watcher - Restart debouncing
//!
//! Debouncing for watch restarts.
//!
//! When the watched path is deleted, renamed, or revoked, the watcher waits
//! for a brief period (the restart delay) before re-opening it. Editors that
//! save by deleting and recreating a file produce a burst of such events;
//! each one pushes the deadline back so the restart happens once, after the
//! burst has settled.

use std::time::{Duration, Instant};

/// Default restart delay in milliseconds.
pub const DEFAULT_RESTART_DELAY_MS: u64 = 150;

/// A single cancellable restart deadline.
///
/// This is a pure data structure with no I/O or threads. The supervisor
/// calls `schedule()` on qualifying events, sleeps for `time_remaining()`,
/// and calls `fire_if_ready()` to learn whether to restart.
#[derive(Debug)]
pub struct RestartDebouncer {
    /// When the pending restart becomes due, if one is pending.
    deadline: Option<Instant>,
    /// Restart delay.
    delay: Duration,
}

impl RestartDebouncer {
    /// Creates a debouncer with the given delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            deadline: None,
            delay,
        }
    }

    /// Creates a debouncer with the default delay (150ms).
    pub fn with_default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_RESTART_DELAY_MS))
    }

    /// Schedules a restart `delay` after `now`, replacing any pending deadline.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Cancels the pending restart, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns true if a restart is pending.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the pending restart is due.
    ///
    /// `None` when nothing is pending; `Duration::ZERO` when overdue.
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Consumes the pending restart if it is due at `now`.
    ///
    /// Returns true exactly once per scheduled restart.
    pub fn fire_if_ready(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
