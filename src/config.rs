// Chunk: docs/chunks/viewer_session - Per-directory viewer configuration
//!
//! Optional `mdview.toml` at the root of the opened directory.
//!
//! ```toml
//! exclude = ["drafts", "archive"]
//! max_results = 30
//! restart_delay_ms = 250
//! retry_while_missing = true
//! ```
//!
//! Every key is optional. A missing file yields the defaults; a file that
//! cannot be read or parsed is reported with `warn!` and also yields the
//! defaults, so a bad config never stops a directory from opening.

use std::path::Path;
use std::time::Duration;

use mdview_index::{ScanOptions, MAX_RESULTS};
use mdview_watcher::WatcherOptions;
use serde::Deserialize;
use tracing::warn;

/// Name of the configuration file looked up in the opened directory.
pub const CONFIG_FILE_NAME: &str = "mdview.toml";

/// Configuration loaded from `mdview.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Directory names to skip in addition to the built-in denylist.
    pub exclude: Option<Vec<String>>,
    /// Cap on quick-open results.
    pub max_results: Option<usize>,
    /// Delay before the watcher re-attaches after a delete or rename.
    pub restart_delay_ms: Option<u64>,
    /// Keep retrying when the watched file cannot be opened.
    pub retry_while_missing: Option<bool>,
}

impl ViewerConfig {
    /// Loads `mdview.toml` from `root`, falling back to defaults.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!("failed to parse {}: {err}. Using defaults.", config_path.display());
                    Self::default()
                }
            },
            Err(err) => {
                warn!("failed to read {}: {err}. Using defaults.", config_path.display());
                Self::default()
            }
        }
    }

    /// Scanner filters: the built-in denylist plus `exclude`.
    pub fn scan_options(&self) -> ScanOptions {
        match &self.exclude {
            Some(extra) => ScanOptions::with_extra_skip_dirs(extra.iter().cloned()),
            None => ScanOptions::default(),
        }
    }

    /// The quick-open result cap (at least 1).
    pub fn max_results(&self) -> usize {
        self.max_results.unwrap_or(MAX_RESULTS).max(1)
    }

    pub fn watcher_options(&self) -> WatcherOptions {
        let defaults = WatcherOptions::default();
        WatcherOptions {
            restart_delay: self
                .restart_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.restart_delay),
            retry_while_missing: self
                .retry_while_missing
                .unwrap_or(defaults.retry_while_missing),
        }
    }
}
